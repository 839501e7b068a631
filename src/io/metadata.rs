//! Sidecar file declaring how a scenario table was produced.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::scenario::{LoadUnit, ScenarioAreas, ScenarioLoadSeries, Truncation};

use super::OUTPUT_TIMESTAMP_FORMAT;

/// Run metadata written next to the scenario table.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Name of the table this metadata describes.
    pub table: String,
    /// Unit of every value in the table.
    pub unit: LoadUnit,
    pub usage_index: f64,
    pub steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    pub scenarios: Vec<ScenarioAreas>,
}

impl RunMetadata {
    pub fn new(
        table: impl Into<String>,
        series: &ScenarioLoadSeries,
        areas: &[ScenarioAreas],
        usage_index: f64,
    ) -> Self {
        let fmt = |ts: &NaiveDateTime| ts.format(OUTPUT_TIMESTAMP_FORMAT).to_string();
        Self {
            table: table.into(),
            unit: series.unit,
            usage_index,
            steps: series.len(),
            first_timestamp: series.timestamps.first().map(fmt),
            last_timestamp: series.timestamps.last().map(fmt),
            truncation: series.truncation,
            scenarios: areas.to_vec(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

/// Sidecar path for a table: `streetlight_load.csv` -> `streetlight_load.meta.toml`.
pub fn metadata_path(table: &Path) -> PathBuf {
    let stem = table
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    table.with_file_name(format!("{stem}.meta.toml"))
}

/// Writes `meta` to the sidecar path of `table` and returns that path.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_metadata(table: &Path, meta: &RunMetadata) -> Result<PathBuf> {
    let path = metadata_path(table);
    fs::write(&path, meta.to_toml()?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Regime;
    use crate::scenario::{AreaTerm, ScenarioSeries};
    use chrono::NaiveDate;

    fn series(truncation: Option<Truncation>) -> ScenarioLoadSeries {
        let t0 = NaiveDate::from_ymd_opt(2014, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        ScenarioLoadSeries {
            timestamps: vec![t0],
            unit: LoadUnit::Kwh,
            series: vec![ScenarioSeries {
                name: "all_night".into(),
                values: vec![1.0],
            }],
            truncation,
        }
    }

    fn areas() -> Vec<ScenarioAreas> {
        vec![ScenarioAreas::new(
            "all_night",
            vec![AreaTerm {
                regime: Regime::B,
                area: 1000.0,
            }],
        )]
    }

    #[test]
    fn sidecar_path_replaces_extension() {
        assert_eq!(
            metadata_path(Path::new("out/streetlight_load.csv")),
            PathBuf::from("out/streetlight_load.meta.toml")
        );
    }

    #[test]
    fn declares_unit_once() {
        let meta = RunMetadata::new("streetlight_load.csv", &series(None), &areas(), 0.004);
        let text = meta.to_toml().expect("serializes");
        assert_eq!(text.matches("unit = \"kWh\"").count(), 1);
        assert!(text.contains("first_timestamp = \"2014-01-01 00:00:00\""));
        assert!(!text.contains("truncation"));
    }

    #[test]
    fn records_truncation_and_terms() {
        let t = Truncation {
            profile_len: 8,
            expected_len: 10,
            used_len: 8,
        };
        let meta = RunMetadata::new("t.csv", &series(Some(t)), &areas(), 0.004);
        let value: toml::Value = toml::from_str(&meta.to_toml().expect("serializes"))
            .expect("metadata is valid TOML");
        assert_eq!(
            value
                .get("truncation")
                .and_then(|t| t.get("used_len"))
                .and_then(toml::Value::as_integer),
            Some(8)
        );
        let regime = value
            .get("scenarios")
            .and_then(|s| s.get(0))
            .and_then(|s| s.get("terms"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("regime"))
            .and_then(toml::Value::as_str);
        assert_eq!(regime, Some("b"));
    }
}
