//! Flat, prefix-keyed report records.
//!
//! A report is the boundary format every pipeline stage exchanges: a flat
//! map from field name to scalar value, where detections live under
//! prefixed keys such as `Object.1.x`. The [`codec`] submodule converts
//! between reports and [`LocatedObjects`](crate::object::LocatedObjects).
//!
//! Reports are carried as plain JSON objects on disk.

pub mod codec;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LocmatchError;
use crate::object::MetaValue;

/// The default field prefix for detection entries.
pub const DEFAULT_PREFIX: &str = "Object.";

/// Field-name suffix for the x coordinate.
pub const KEY_X: &str = ".x";
/// Field-name suffix for the y coordinate.
pub const KEY_Y: &str = ".y";
/// Field-name suffix for the width.
pub const KEY_WIDTH: &str = ".width";
/// Field-name suffix for the height.
pub const KEY_HEIGHT: &str = ".height";
/// Field-name suffix for the quadrilateral location string.
pub const KEY_LOCATION: &str = ".location";
/// Field-name suffix for the polygon x coordinate list.
pub const KEY_POLY_X: &str = ".poly_x";
/// Field-name suffix for the polygon y coordinate list.
pub const KEY_POLY_Y: &str = ".poly_y";
/// Field name (relative to the prefix) for the overall object count.
pub const KEY_COUNT: &str = "count";

/// A flat, ordered field map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub fields: BTreeMap<String, MetaValue>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<MetaValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the field value, if present.
    pub fn get(&self, name: &str) -> Option<&MetaValue> {
        self.fields.get(name)
    }

    /// Returns true if the field exists.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the field as a number, if present and numeric.
    pub fn double(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(MetaValue::as_f64)
    }

    /// Returns the field in string form, if present.
    pub fn string(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| v.to_string())
    }

    /// Merges another report into this one; the other report's fields win
    /// on collision.
    pub fn merge(&mut self, other: &Report) {
        for (name, value) in &other.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    /// Returns a new report holding only the fields that do NOT start with
    /// the given prefix.
    pub fn without_prefix(&self, prefix: &str) -> Report {
        Report {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| !name.starts_with(prefix))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Reads a report from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_report_json(path: &Path) -> Result<Report, LocmatchError> {
    let file = File::open(path).map_err(LocmatchError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| LocmatchError::ReportJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a report to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_report_json(path: &Path, report: &Report) -> Result<(), LocmatchError> {
    let file = File::create(path).map_err(LocmatchError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(|source| LocmatchError::ReportJsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a report from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<Report, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a report to a JSON string.
///
/// Useful for testing without file I/O.
pub fn to_json_string(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
