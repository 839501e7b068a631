//! CSV export for scenario load series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::config::OutputConfig;
use crate::error::Result;
use crate::scenario::ScenarioLoadSeries;

use super::OUTPUT_TIMESTAMP_FORMAT;

/// Header of the timestamp column.
pub const TIME_COLUMN: &str = "TIME";

/// Number formatting for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub delimiter: u8,
    pub decimal_separator: char,
    pub precision: usize,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal_separator: '.',
            precision: 6,
        }
    }
}

impl From<&OutputConfig> for TableFormat {
    fn from(o: &OutputConfig) -> Self {
        Self {
            delimiter: o.delimiter as u8,
            decimal_separator: o.decimal_separator,
            precision: o.precision,
        }
    }
}

impl TableFormat {
    /// Formats `value` with the configured precision and decimal separator.
    pub fn number(&self, value: f64) -> String {
        let s = format!("{:.prec$}", value, prec = self.precision);
        if self.decimal_separator == '.' {
            s
        } else {
            s.replace('.', &self.decimal_separator.to_string())
        }
    }
}

/// Exports scenario series to a CSV file at the given path.
///
/// Writes a `TIME;<scenario>;...` header followed by one row per timestep.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_csv(series: &ScenarioLoadSeries, path: &Path, format: TableFormat) -> Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(series, buf, format)
}

/// Writes scenario series as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv(series: &ScenarioLoadSeries, writer: impl Write, format: TableFormat) -> Result<()> {
    write_rows(series.names(), series.rows(), writer, format, 1.0)
}

/// Exports rows of `series` in `[from, until)` with every value divided by
/// 1000 (kW to MW, kWh to MWh).
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_window_csv(
    series: &ScenarioLoadSeries,
    from: NaiveDateTime,
    until: NaiveDateTime,
    path: &Path,
    format: TableFormat,
) -> Result<usize> {
    let rows = series.window(from, until);
    let count = rows.len();
    let file = File::create(path)?;
    write_rows(
        series.names(),
        rows.into_iter(),
        io::BufWriter::new(file),
        format,
        1000.0,
    )?;
    Ok(count)
}

fn write_rows<'a>(
    names: impl Iterator<Item = &'a str>,
    rows: impl Iterator<Item = (NaiveDateTime, Vec<f64>)>,
    writer: impl Write,
    format: TableFormat,
    divisor: f64,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delimiter)
        .from_writer(writer);

    // Header
    let mut header = vec![TIME_COLUMN.to_string()];
    header.extend(names.map(str::to_string));
    wtr.write_record(&header)?;

    // Data rows
    for (ts, values) in rows {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(ts.format(OUTPUT_TIMESTAMP_FORMAT).to_string());
        record.extend(values.iter().map(|v| format.number(v / divisor)));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
