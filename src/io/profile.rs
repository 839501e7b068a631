//! Standard load profile reader.

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::config::ProfileConfig;
use crate::error::{Result, SimError};
use crate::profile::{LoadProfile, LoadProfilePoint};

use super::{column_index, open_input, parse_number, parse_timestamp};

/// Reads and validates the load profile at `path`.
///
/// # Errors
///
/// See [`read_profile`].
pub fn read_profile_file(path: &Path, layout: &ProfileConfig) -> Result<LoadProfile> {
    let file = open_input(path)?;
    let profile = read_profile(file, path, layout)?;
    info!(
        path = %path.display(),
        steps = profile.len(),
        step_hours = profile.step_hours(),
        "read load profile"
    );
    Ok(profile)
}

/// Reads a load profile table; stored values are divided by `layout.scale`.
///
/// # Errors
///
/// Returns `SimError::MissingInput` if a configured column is absent, and
/// `SimError::Validation` naming the 1-based data row for unparsable values,
/// fractions outside `[0, 1]`, or timestamps that are not strictly
/// increasing.
pub fn read_profile(reader: impl Read, path: &Path, layout: &ProfileConfig) -> Result<LoadProfile> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter as u8)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let ts_idx = column_index(&headers, &layout.timestamp_column, path)?;
    let a_idx = column_index(&headers, &layout.regime_a_column, path)?;
    let b_idx = column_index(&headers, &layout.regime_b_column, path)?;

    let mut points = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let timestamp = parse_timestamp(field(ts_idx)).ok_or_else(|| {
            SimError::at_row(row, format!("unrecognised timestamp \"{}\"", field(ts_idx)))
        })?;
        let value = |idx: usize, column: &str| {
            parse_number(field(idx))
                .map(|v| v / layout.scale)
                .ok_or_else(|| {
                    SimError::at_row(
                        row,
                        format!("column \"{column}\" value \"{}\" is not a number", field(idx)),
                    )
                })
        };
        points.push(LoadProfilePoint::new(
            timestamp,
            value(a_idx, &layout.regime_a_column)?,
            value(b_idx, &layout.regime_b_column)?,
        ));
    }

    LoadProfile::new(points)
}
