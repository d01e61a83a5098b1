//! Day relabeling.
//!
//! Renames buckets by substituting labels simultaneously: every point is
//! looked up in the mapping by its label *before* the rename, so swaps
//! (`1 → 2`, `2 → 1`) and chains behave as written. Mapping several old
//! labels to one new label merges those buckets.
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeMap;
//! use u_dayplan::models::{Assignment, DayLabel, Point, PointSet};
//! use u_dayplan::relabel::relabel;
//!
//! let points = PointSet::new(vec![
//!     Point::new("a", 0.0, 0.0).with_label(1),
//!     Point::new("b", 0.0, 1.0).with_label(2),
//! ]);
//! let mut assignment = Assignment::from_points(&points);
//! let mapping = BTreeMap::from([(DayLabel::day(1), DayLabel::from("Monday"))]);
//!
//! assert_eq!(relabel(&mut assignment, &mapping), 1);
//! assert_eq!(assignment.label_of("a"), Some(&DayLabel::from("Monday")));
//! assert_eq!(assignment.label_of("b"), Some(&DayLabel::day(2)));
//! ```

use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Assignment, DayLabel};

/// Old label → new label.
pub type LabelMapping = BTreeMap<DayLabel, DayLabel>;

/// Applies `mapping` to every point and returns how many labels changed.
///
/// Labels absent from the mapping are left as they are; identity entries
/// change nothing.
pub fn relabel(assignment: &mut Assignment, mapping: &LabelMapping) -> usize {
    let mut changed = 0;
    for label in assignment.labels_mut() {
        if let Some(new) = mapping.get(label) {
            if new != label {
                *label = new.clone();
                changed += 1;
            }
        }
    }
    debug!(entries = mapping.len(), changed, "labels rewritten");
    changed
}

/// Builds a mapping from user-entered names.
///
/// Entries whose old label is not in `present`, whose new name is blank,
/// or whose new name parses to the old label are skipped.
pub fn rename_plan<S: AsRef<str>>(
    present: &[DayLabel],
    entries: impl IntoIterator<Item = (DayLabel, S)>,
) -> LabelMapping {
    entries
        .into_iter()
        .filter(|(old, _)| present.contains(old))
        .filter_map(|(old, name)| {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return None;
            }
            let new = DayLabel::parse(name);
            (new != old).then_some((old, new))
        })
        .collect()
}
