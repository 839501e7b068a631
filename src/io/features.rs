//! Feature table reader.

use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::config::FeatureSourceConfig;
use crate::error::{Result, SimError};
use crate::features::{Feature, FeatureKind};

use super::{column_index, open_input, parse_number};

/// Reads every configured feature table and unions the rows.
///
/// # Errors
///
/// See [`read_features`].
pub fn read_feature_sources(sources: &[FeatureSourceConfig]) -> Result<Vec<Feature>> {
    let mut features = Vec::new();
    for source in sources {
        let file = open_input(&source.path)?;
        let mut batch = read_features(
            file,
            &source.path,
            source.kind,
            &source.category_column,
            &source.area_column,
        )?;
        info!(
            path = %source.path.display(),
            kind = %source.kind,
            rows = batch.len(),
            "read feature table"
        );
        features.append(&mut batch);
    }
    Ok(features)
}

/// Reads one comma-delimited feature table.
///
/// Rows with an empty category or area are skipped and counted in a
/// warning. Other columns are ignored.
///
/// # Errors
///
/// Returns `SimError::MissingInput` if a required column is absent, and
/// `SimError::Validation` naming the 1-based data row if an area does not
/// parse or is negative.
pub fn read_features(
    reader: impl Read,
    path: &Path,
    kind: FeatureKind,
    category_column: &str,
    area_column: &str,
) -> Result<Vec<Feature>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cat_idx = column_index(&headers, category_column, path)?;
    let area_idx = column_index(&headers, area_column, path)?;

    let mut features = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let category = record.get(cat_idx).map(str::trim).unwrap_or_default();
        let raw_area = record.get(area_idx).map(str::trim).unwrap_or_default();
        if category.is_empty() || raw_area.is_empty() {
            skipped += 1;
            continue;
        }
        let area = parse_number(raw_area).ok_or_else(|| {
            SimError::at_row(
                row,
                format!("{}: area \"{raw_area}\" is not a number", path.display()),
            )
        })?;
        if !area.is_finite() || area < 0.0 {
            return Err(SimError::at_row(
                row,
                format!("{}: area {area} must be >= 0", path.display()),
            ));
        }
        features.push(Feature::new(category, area, kind));
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped feature rows with empty category or area");
    }
    Ok(features)
}
