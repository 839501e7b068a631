//! Joins the scenario load with renewable feed-in for a downstream optimizer.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, SimError};
use crate::scenario::ScenarioLoadSeries;

use super::{column_index, open_input, parse_number};

/// One row of the feed-in table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedInRow {
    /// Timestamp exactly as read; the optimizer parses it itself.
    pub time: String,
    pub pv: f64,
    pub wind: f64,
}

/// Reads a comma-delimited feed-in table with `time`, `pv` and `wind`
/// columns.
///
/// # Errors
///
/// Returns `SimError::MissingInput` for a missing file or column and
/// `SimError::Validation` naming the 1-based data row for unparsable values.
pub fn read_feedin(reader: impl Read, path: &Path) -> Result<Vec<FeedInRow>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let time_idx = column_index(&headers, "time", path)?;
    let pv_idx = column_index(&headers, "pv", path)?;
    let wind_idx = column_index(&headers, "wind", path)?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let number = |idx: usize, column: &str| {
            let raw = record.get(idx).unwrap_or_default();
            parse_number(raw).ok_or_else(|| {
                SimError::at_row(row, format!("column \"{column}\" value \"{raw}\" is not a number"))
            })
        };
        rows.push(FeedInRow {
            time: record.get(time_idx).unwrap_or_default().trim().to_string(),
            pv: number(pv_idx, "pv")?,
            wind: number(wind_idx, "wind")?,
        });
    }
    Ok(rows)
}

/// Reads the feed-in table at `path`.
///
/// # Errors
///
/// See [`read_feedin`].
pub fn read_feedin_file(path: &Path) -> Result<Vec<FeedInRow>> {
    read_feedin(open_input(path)?, path)
}

/// Writes `time,pv,wind,demand_<scenario>...` aligned by row position.
///
/// When the feed-in table and the load series differ in length, both are cut
/// to the shorter one and a warning is logged. Returns the number of rows
/// written.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_commodities(
    feedin: &[FeedInRow],
    load: &ScenarioLoadSeries,
    writer: impl Write,
) -> Result<usize> {
    let rows = feedin.len().min(load.len());
    if feedin.len() != load.len() {
        warn!(
            feedin_len = feedin.len(),
            load_len = load.len(),
            used_len = rows,
            "feed-in and load series differ in length; truncating"
        );
    }

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["time".to_string(), "pv".to_string(), "wind".to_string()];
    header.extend(load.names().map(|n| format!("demand_{n}")));
    wtr.write_record(&header)?;

    for (f, (_, values)) in feedin.iter().zip(load.rows()) {
        let mut record = vec![f.time.clone(), f.pv.to_string(), f.wind.to_string()];
        record.extend(values.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(rows)
}

/// Writes the joined table to `path`.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_commodities(
    feedin: &[FeedInRow],
    load: &ScenarioLoadSeries,
    path: &Path,
) -> Result<usize> {
    let file = File::create(path)?;
    let rows = write_commodities(feedin, load, io::BufWriter::new(file))?;
    info!(path = %path.display(), rows, "wrote optimization commodities");
    Ok(rows)
}
