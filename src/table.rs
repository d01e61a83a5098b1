//! Point table import and export (CSV).
//!
//! # Import
//!
//! Columns are matched by normalized header (lowercase, spaces removed):
//!
//! | Role | Accepted headers |
//! |------|------------------|
//! | latitude | `Latitud`, `lat`, `latitude` |
//! | longitude | `Longitud`, `lng`, `lon`, `longitude` |
//! | day label (optional) | `Dia`, `day` |
//! | point id (optional) | `id`; otherwise the 1-based row number |
//! | display attribute (optional) | first header containing `contrato` or `contract` |
//!
//! Every column except the day label is kept verbatim as a point
//! attribute, so identifier-like values (leading zeros, long codes) are
//! exported exactly as read.
//!
//! # Export
//!
//! The full distribution, the per-day summary and one table per day, named
//! after the sheets of the planning workbook.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Assignment, DayLabel, Point, PointSet};
use crate::summary::DayBucket;

/// Name of the full-distribution table.
pub const DISTRIBUTION_SHEET: &str = "Distribucion_Final";
/// Name of the summary table.
pub const SUMMARY_SHEET: &str = "Resumen";
/// Default header of the day-label column.
pub const LABEL_COLUMN: &str = "Dia";
/// Header of the count column in the summary.
pub const COUNT_COLUMN: &str = "Cantidad_puntos";

/// Table errors.
#[derive(Debug, Error)]
pub enum TableError {
    /// Underlying CSV error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// File system error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is missing.
    #[error("missing {0} column")]
    MissingColumn(&'static str),

    /// A coordinate cell could not be parsed.
    #[error("row {row}: cannot parse {column} value '{value}'")]
    InvalidCoordinate {
        /// 1-based data row.
        row: usize,
        /// Column header.
        column: String,
        /// Cell text.
        value: String,
    },
}

/// Column roles detected in a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Latitude column index.
    pub lat: usize,
    /// Longitude column index.
    pub lng: usize,
    /// Day-label column index.
    pub label: Option<usize>,
    /// Id column index.
    pub id: Option<usize>,
    /// Display attribute column index.
    pub display: Option<usize>,
}

fn position_of(normalized: &[String], names: &[&str]) -> Option<usize> {
    normalized.iter().position(|h| names.contains(&h.as_str()))
}

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ColumnLayout {
    /// Detects column roles.
    pub fn detect(headers: &[String]) -> Result<Self, TableError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
        Ok(Self {
            lat: position_of(&normalized, &["latitud", "lat", "latitude"])
                .ok_or(TableError::MissingColumn("latitude"))?,
            lng: position_of(&normalized, &["longitud", "lng", "lon", "longitude"])
                .ok_or(TableError::MissingColumn("longitude"))?,
            label: position_of(&normalized, &["dia", "día", "day"]),
            id: position_of(&normalized, &["id"]),
            display: normalized
                .iter()
                .position(|h| h.contains("contrato") || h.contains("contract")),
        })
    }
}

/// An imported point table.
#[derive(Debug, Clone)]
pub struct PointTable {
    headers: Vec<String>,
    layout: ColumnLayout,
    points: PointSet,
}

impl PointTable {
    /// Reads a comma-separated table.
    pub fn read<R: Read>(reader: R) -> Result<Self, TableError> {
        Self::read_with_delimiter(reader, b',')
    }

    /// Reads a table with the given delimiter.
    pub fn read_with_delimiter<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let layout = ColumnLayout::detect(&headers)?;

        let mut points = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let cell = |col: usize| record.get(col).unwrap_or("");

            let lat = parse_coordinate(cell(layout.lat), row, &headers[layout.lat])?;
            let lng = parse_coordinate(cell(layout.lng), row, &headers[layout.lng])?;
            let id = match layout.id {
                Some(col) if !cell(col).trim().is_empty() => cell(col).trim().to_string(),
                _ => row.to_string(),
            };

            let mut point = Point::new(id, lat, lng);
            if let Some(col) = layout.label {
                let text = cell(col);
                if !text.trim().is_empty() {
                    point = point.with_label(DayLabel::parse(text));
                }
            }
            for (col, header) in headers.iter().enumerate() {
                if Some(col) != layout.label {
                    point = point.with_attribute(header.clone(), cell(col));
                }
            }
            points.push(point);
        }

        let mut set = PointSet::new(points);
        if let Some(col) = layout.display {
            set = set.with_display_attribute(headers[col].clone());
        }
        debug!(rows = set.len(), columns = headers.len(), "point table read");

        Ok(Self {
            headers,
            layout,
            points: set,
        })
    }

    /// Reads a table from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::read(File::open(path)?)
    }

    /// Imported points.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Consumes the table, returning its points.
    pub fn into_points(self) -> PointSet {
        self.points
    }

    /// Detected column layout.
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Header row as read.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn label_header(&self) -> &str {
        self.layout
            .label
            .map_or(LABEL_COLUMN, |col| self.headers[col].as_str())
    }

    /// Output header row: input columns with the label column in place
    /// (or appended when the input had none).
    fn output_headers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        if self.layout.label.is_none() {
            out.push(LABEL_COLUMN);
        }
        out
    }

    fn output_row(&self, index: usize, label: &DayLabel) -> Vec<String> {
        let point = &self.points.points()[index];
        let mut row: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                if Some(col) == self.layout.label {
                    label.to_string()
                } else {
                    point.attributes.get(header).cloned().unwrap_or_default()
                }
            })
            .collect();
        if self.layout.label.is_none() {
            row.push(label.to_string());
        }
        row
    }

    /// Writes every point with its assigned label.
    pub fn write_distribution<W: Write>(
        &self,
        writer: W,
        assignment: &Assignment,
    ) -> Result<(), TableError> {
        self.write_rows(writer, assignment, |_| true)
    }

    /// Writes the points of one day.
    pub fn write_day<W: Write>(
        &self,
        writer: W,
        assignment: &Assignment,
        label: &DayLabel,
    ) -> Result<(), TableError> {
        self.write_rows(writer, assignment, |l| l == label)
    }

    fn write_rows<W: Write>(
        &self,
        writer: W,
        assignment: &Assignment,
        keep: impl Fn(&DayLabel) -> bool,
    ) -> Result<(), TableError> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(self.output_headers())?;
        for (i, label) in assignment.labels().iter().enumerate() {
            if i < self.points.len() && keep(label) {
                w.write_record(self.output_row(i, label))?;
            }
        }
        w.flush()?;
        Ok(())
    }

    /// Writes the per-day summary (`Dia,Cantidad_puntos`).
    pub fn write_summary<W: Write>(&self, writer: W, summary: &[DayBucket]) -> Result<(), TableError> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record([self.label_header(), COUNT_COLUMN])?;
        for bucket in summary {
            w.write_record([bucket.label.to_string(), bucket.count.to_string()])?;
        }
        w.flush()?;
        Ok(())
    }

    /// Writes the distribution, the summary and one file per day into `dir`.
    ///
    /// Returns the written paths in that order.
    pub fn export_all(
        &self,
        dir: impl AsRef<Path>,
        assignment: &Assignment,
        summary: &[DayBucket],
    ) -> Result<Vec<PathBuf>, TableError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let path = dir.join(format!("{DISTRIBUTION_SHEET}.csv"));
        self.write_distribution(File::create(&path)?, assignment)?;
        written.push(path);

        let path = dir.join(format!("{SUMMARY_SHEET}.csv"));
        self.write_summary(File::create(&path)?, summary)?;
        written.push(path);

        for label in assignment.distinct_labels() {
            let path = dir.join(day_file_name(&label));
            self.write_day(File::create(&path)?, assignment, &label)?;
            written.push(path);
        }
        info!(files = written.len(), dir = %dir.display(), "distribution exported");
        Ok(written)
    }
}

fn parse_coordinate(text: &str, row: usize, column: &str) -> Result<f64, TableError> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
        .map_err(|_| TableError::InvalidCoordinate {
            row,
            column: column.to_string(),
            value: text.to_string(),
        })
}

/// Sheet name of one day (`Dia_{label}`).
pub fn day_sheet_name(label: &DayLabel) -> String {
    format!("Dia_{}", label.file_safe())
}

/// File name of one day (`distribucion_dia_{label}.csv`).
pub fn day_file_name(label: &DayLabel) -> String {
    format!("distribucion_dia_{}.csv", label.file_safe())
}
