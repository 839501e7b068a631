//! End-to-end pipeline: read inputs, compute scenarios, write outputs.

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::{Result, SimError};
use crate::io::commodities::{export_commodities, read_feedin_file};
use crate::io::export::{TableFormat, export_csv, export_window_csv};
use crate::io::features::read_feature_sources;
use crate::io::metadata::{RunMetadata, write_metadata};
use crate::io::profile::read_profile_file;
use crate::scenario::{ScenarioAreas, ScenarioLoadEngine, ScenarioLoadSeries};
use crate::summary::SummaryReport;

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub areas: Vec<ScenarioAreas>,
    pub series: ScenarioLoadSeries,
    pub summary: SummaryReport,
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
}

/// Runs the configured pipeline.
///
/// Writes the scenario table and its metadata sidecar into
/// `paths.output_dir`, plus the report window and the commodities table when
/// configured.
///
/// # Errors
///
/// Returns `SimError::Config` with every invalid field before touching any
/// file, and propagates input, validation and I/O errors otherwise.
pub fn run(config: &ScenarioConfig) -> Result<RunOutcome> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }

    let features = read_feature_sources(&config.feature_sources)?;
    let profile = read_profile_file(&config.paths.profile, &config.profile)?;

    let sim = &config.simulation;
    let engine = ScenarioLoadEngine::new(sim.usage_index, sim.expected_steps, sim.unit);
    let (areas, series) = engine.run(
        &features,
        &profile,
        &config.scenarios,
        &config.category_sets,
    )?;

    let out_dir = &config.paths.output_dir;
    fs::create_dir_all(out_dir)?;
    let format = TableFormat::from(&config.output);
    let mut outputs = Vec::new();

    let table = out_dir.join(&config.output.file_name);
    export_csv(&series, &table, format)?;
    info!(path = %table.display(), rows = series.len(), "wrote scenario table");
    let meta = RunMetadata::new(
        config.output.file_name.clone(),
        &series,
        &areas,
        sim.usage_index,
    );
    outputs.push(table.clone());
    outputs.push(write_metadata(&table, &meta)?);

    if let (Some(start), Some(end)) = (config.report.window_start, config.report.window_end) {
        let (from, until) = day_bounds(start, end);
        let path = out_dir.join(config.report.window_file_name());
        let rows = export_window_csv(&series, from, until, &path, format)?;
        info!(path = %path.display(), rows, %start, %end, "wrote report window");
        outputs.push(path);
    }

    if let Some(feedin_path) = &config.paths.feedin {
        let feedin = read_feedin_file(feedin_path)?;
        let path = out_dir.join(&config.output.commodities_file_name);
        export_commodities(&feedin, &series, &path)?;
        outputs.push(path);
    }

    let summary = SummaryReport::from_series(&series, &areas, profile.step_hours());
    Ok(RunOutcome {
        areas,
        series,
        summary,
        outputs,
    })
}

/// Half-open instant range covering the whole days `start..=end`.
fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let until = end
        .succ_opt()
        .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));
    (start.and_time(NaiveTime::MIN), until)
}
