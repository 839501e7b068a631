//! CSV adapters for feature tables, load profiles and output tables.

pub mod commodities;
pub mod export;
pub mod features;
pub mod metadata;
pub mod profile;

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

use crate::error::{Result, SimError};

/// Timestamp layouts accepted in input tables, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Offset-qualified layouts, tried after RFC 3339.
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"];

/// Layout used for every timestamp this crate writes.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses an ISO-8601 or German-locale timestamp.
///
/// Timestamps carrying a UTC offset (`+01:00`, `Z`) keep their local wall
/// time; the offset is dropped.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .or_else(|| {
                    OFFSET_TIMESTAMP_FORMATS
                        .iter()
                        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
                })
                .map(|dt| dt.naive_local())
        })
}

/// Parses a number written with either `.` or `,` as decimal separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .or_else(|| raw.replace(',', ".").parse::<f64>().ok())
}

/// Opens an input table, mapping a missing file to `SimError::MissingInput`.
fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SimError::MissingInput {
            path: path.to_path_buf(),
            detail: "file not found".to_string(),
        },
        _ => SimError::Io(e),
    })
}

/// Position of `name` in `headers`, or `SimError::MissingInput`.
fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SimError::MissingInput {
            path: path.to_path_buf(),
            detail: format!("required column \"{name}\" not found"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_iso_and_locale_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2014, 1, 1).and_then(|d| d.and_hms_opt(0, 15, 0));
        for raw in [
            "2014-01-01 00:15:00",
            "2014-01-01T00:15:00",
            "2014-01-01 00:15",
            "01.01.2014 00:15",
            " 01.01.2014 00:15:00 ",
        ] {
            assert_eq!(parse_timestamp(raw), expected, "failed on {raw:?}");
        }
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn offset_timestamps_keep_local_wall_time() {
        let expected = NaiveDate::from_ymd_opt(2014, 1, 1).and_then(|d| d.and_hms_opt(0, 15, 0));
        for raw in [
            "2014-01-01T00:15:00+01:00",
            "2014-01-01 00:15:00+01:00",
            "2014-01-01T00:15:00Z",
            "2014-01-01 00:15+01:00",
        ] {
            assert_eq!(parse_timestamp(raw), expected, "failed on {raw:?}");
        }
    }

    #[test]
    fn parses_decimal_comma() {
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number(" 3 "), Some(3.0));
        assert!(parse_number("n/a").is_none());
    }
}
