//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use streetlight_sim::config::{FeatureSourceConfig, ScenarioConfig};
use streetlight_sim::features::FeatureKind;

/// Number of hourly rows in the fixture profile.
pub const STEPS: usize = 10;

/// Usage index used by every fixture configuration.
pub const USAGE_INDEX: f64 = 0.004;

/// Line area on main roads (primary 600 + motorway 400).
pub const MAIN_ROAD_AREA: f64 = 1000.0;
/// Line area off main roads (footway 300 + residential 200).
pub const OTHER_LINE_AREA: f64 = 500.0;
/// Polygon (square) area.
pub const SQUARE_AREA: f64 = 100.0;

/// Regime fractions `(a, b)` of fixture row `i`, before scaling by 1000.
pub fn raw_fractions(i: usize) -> (f64, f64) {
    ((i * 10) as f64, (100 + i * 20) as f64)
}

/// Writes feature and profile tables with `steps` hourly rows into `dir`.
pub fn write_inputs(dir: &Path, steps: usize) {
    fs::write(
        dir.join("lines.csv"),
        "osm_id,highway,area\n\
         1,primary,600\n\
         2,motorway,400\n\
         3,footway,300\n\
         4,residential,200\n\
         5,,75\n",
    )
    .expect("write line features");
    fs::write(dir.join("squares.csv"), "osm_id,highway,area\n6,pedestrian,100\n")
        .expect("write polygon features");

    let mut profile = String::from("timestamp;regime_a;regime_b\n");
    for i in 0..steps {
        let (a, b) = raw_fractions(i);
        profile.push_str(&format!(
            "2014-01-{:02} {:02}:00:00;{a};{b}\n",
            1 + i / 24,
            i % 24
        ));
    }
    fs::write(dir.join("slp.csv"), profile).expect("write load profile");
}

/// Baseline configuration reading fixture inputs from `dir` and writing to
/// `dir/out`.
pub fn default_config(dir: &Path) -> ScenarioConfig {
    write_inputs(dir, STEPS);
    let mut cfg = ScenarioConfig::baseline();
    cfg.feature_sources = vec![
        FeatureSourceConfig::new(dir.join("lines.csv"), FeatureKind::Line),
        FeatureSourceConfig::new(dir.join("squares.csv"), FeatureKind::Polygon),
    ];
    cfg.paths.profile = dir.join("slp.csv");
    cfg.paths.output_dir = dir.join("out");
    cfg.simulation.usage_index = USAGE_INDEX;
    cfg
}

/// Path of the scenario table written by [`default_config`].
pub fn table_path(dir: &Path) -> PathBuf {
    dir.join("out").join("streetlight_load.csv")
}

/// Reads a `;`-delimited scenario table into `(header, rows)`.
pub fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .expect("scenario table should exist");
    let header = rdr
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("valid row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

/// Scenario TOML pointing at fixture inputs in `dir`, with `extra`
/// appended verbatim.
pub fn scenario_toml(dir: &Path, out: &str, extra: &str) -> String {
    format!(
        "[simulation]\n\
         usage_index = {USAGE_INDEX}\n\
         \n\
         [paths]\n\
         profile = '{profile}'\n\
         output_dir = '{out_dir}'\n\
         \n\
         [[feature_sources]]\n\
         path = '{lines}'\n\
         kind = \"line\"\n\
         \n\
         [[feature_sources]]\n\
         path = '{squares}'\n\
         kind = \"polygon\"\n\
         \n\
         {extra}",
        profile = dir.join("slp.csv").display(),
        out_dir = dir.join(out).display(),
        lines = dir.join("lines.csv").display(),
        squares = dir.join("squares.csv").display(),
    )
}
