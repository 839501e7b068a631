//! Output timeseries of the scenario engine.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unit of every value in a [`ScenarioLoadSeries`], fixed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadUnit {
    /// Average power over each timestep.
    #[default]
    #[serde(rename = "kW")]
    Kw,
    /// Energy consumed during each timestep.
    #[serde(rename = "kWh")]
    Kwh,
}

impl fmt::Display for LoadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kw => write!(f, "kW"),
            Self::Kwh => write!(f, "kWh"),
        }
    }
}

/// Record of the profile being cut to the configured horizon, or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Truncation {
    /// Number of points in the load profile.
    pub profile_len: usize,
    /// Number of timesteps the run was configured for.
    pub expected_len: usize,
    /// Number of timesteps actually emitted.
    pub used_len: usize,
}

/// Load values of one scenario, one per timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Per-timestep load for every scenario, sharing one timestamp axis.
///
/// Scenario order follows the configuration order; timestamps keep the
/// profile's chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioLoadSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub unit: LoadUnit,
    pub series: Vec<ScenarioSeries>,
    /// Set when the emitted length differs from the profile or the horizon.
    pub truncation: Option<Truncation>,
}

impl ScenarioLoadSeries {
    /// Number of complete rows: timesteps that have a value in every
    /// scenario.
    pub fn len(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.values.len())
            .fold(self.timestamps.len(), usize::min)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of the scenario called `name`.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    /// Complete rows as `(timestamp, values)` with values in scenario order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDateTime, Vec<f64>)> + '_ {
        self.timestamps
            .iter()
            .take(self.len())
            .enumerate()
            .map(|(i, ts)| {
                let values = self
                    .series
                    .iter()
                    .filter_map(|s| s.values.get(i).copied())
                    .collect();
                (*ts, values)
            })
    }

    /// Rows whose timestamp falls in `[from, until)`.
    pub fn window(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Vec<(NaiveDateTime, Vec<f64>)> {
        self.rows()
            .filter(|(ts, _)| *ts >= from && *ts < until)
            .collect()
    }
}
