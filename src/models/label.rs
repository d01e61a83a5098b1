//! Day bucket labels.
//!
//! Strategies number buckets `1..=D`. After a rename the label may be any
//! string ("Monday", "Zona Norte"). A reserved integer label marks points
//! that are not assigned to any bucket.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a day bucket.
///
/// Ordering places integer labels before names, so summaries list the
/// numbered days first (numerically) followed by renamed days (lexically).
///
/// Serializes as a bare integer or string. Deserialized strings go through
/// [`DayLabel::parse`], so `"3"` and `3` are the same label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged, from = "LabelRepr")]
pub enum DayLabel {
    /// Numbered day (strategies produce `1..=D`).
    Index(i64),
    /// User-chosen name.
    Name(String),
}

impl DayLabel {
    /// The unassigned sentinel (`-1`).
    pub const UNASSIGNED: DayLabel = DayLabel::Index(-1);

    /// Label for the 1-based day number.
    pub fn day(number: usize) -> Self {
        DayLabel::Index(number as i64)
    }

    /// Parses user or table text.
    ///
    /// Integers (including `-1`) become [`DayLabel::Index`]; anything else
    /// becomes a trimmed [`DayLabel::Name`]. Blank text is the sentinel.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return DayLabel::UNASSIGNED;
        }
        match trimmed.parse::<i64>() {
            Ok(n) => DayLabel::Index(n),
            Err(_) => DayLabel::Name(trimmed.to_string()),
        }
    }

    /// Whether this is the unassigned sentinel.
    #[inline]
    pub fn is_unassigned(&self) -> bool {
        *self == DayLabel::UNASSIGNED
    }

    /// Label text with whitespace replaced by `_`, for file and sheet names.
    pub fn file_safe(&self) -> String {
        self.to_string()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }
}

/// Wire form accepted when deserializing a [`DayLabel`].
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Index(i64),
    Text(String),
}

impl From<LabelRepr> for DayLabel {
    fn from(repr: LabelRepr) -> Self {
        match repr {
            LabelRepr::Index(n) => DayLabel::Index(n),
            LabelRepr::Text(text) => DayLabel::parse(&text),
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayLabel::Index(n) => write!(f, "{n}"),
            DayLabel::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for DayLabel {
    fn from(value: i64) -> Self {
        DayLabel::Index(value)
    }
}

impl From<i32> for DayLabel {
    fn from(value: i32) -> Self {
        DayLabel::Index(value as i64)
    }
}

impl From<&str> for DayLabel {
    fn from(value: &str) -> Self {
        DayLabel::parse(value)
    }
}

impl From<String> for DayLabel {
    fn from(value: String) -> Self {
        DayLabel::parse(&value)
    }
}
