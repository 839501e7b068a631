//! Post-hoc annual totals computed from a scenario load series.

use std::fmt;

use crate::scenario::{LoadUnit, ScenarioAreas, ScenarioLoadSeries};

/// Totals for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub name: String,
    /// Lit area summed over all regime terms (m²).
    pub total_area_m2: f64,
    /// Energy over the whole series (kWh).
    pub energy_kwh: f64,
    /// Largest single value, in the series unit.
    pub peak: f64,
}

impl ScenarioSummary {
    /// Energy in GWh.
    pub fn energy_gwh(&self) -> f64 {
        self.energy_kwh / 1.0e6
    }
}

/// Aggregate figures derived from a complete run.
///
/// Computed from the emitted series so the report always matches the
/// exported table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub unit: LoadUnit,
    pub steps: usize,
    pub step_hours: f64,
    pub scenarios: Vec<ScenarioSummary>,
}

impl SummaryReport {
    /// Builds the report.
    ///
    /// # Arguments
    ///
    /// * `series` - Emitted load series
    /// * `areas` - Area terms per scenario, matched by name
    /// * `step_hours` - Timestep duration, used to turn kW into kWh
    pub fn from_series(series: &ScenarioLoadSeries, areas: &[ScenarioAreas], step_hours: f64) -> Self {
        let scenarios = series
            .series
            .iter()
            .map(|s| {
                let sum: f64 = s.values.iter().sum();
                let energy_kwh = match series.unit {
                    LoadUnit::Kwh => sum,
                    LoadUnit::Kw => sum * step_hours,
                };
                let peak = s.values.iter().copied().fold(0.0_f64, f64::max);
                let total_area_m2 = areas
                    .iter()
                    .find(|a| a.name == s.name)
                    .map_or(0.0, ScenarioAreas::total_area);
                ScenarioSummary {
                    name: s.name.clone(),
                    total_area_m2,
                    energy_kwh,
                    peak,
                }
            })
            .collect();

        Self {
            unit: series.unit,
            steps: series.len(),
            step_hours,
            scenarios,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioSummary> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Streetlight Load Report ---")?;
        writeln!(
            f,
            "Timesteps:             {} ({:.2} h each, {})",
            self.steps, self.step_hours, self.unit
        )?;
        for s in &self.scenarios {
            writeln!(f, "{}:", s.name)?;
            writeln!(f, "  Lit area:            {:.1} m2", s.total_area_m2)?;
            writeln!(f, "  Peak load:           {:.3} {}", s.peak, self.unit)?;
            writeln!(f, "  Energy:              {:.3} kWh", s.energy_kwh)?;
            writeln!(f, "  Annual energy:       {:.6} GWh/yr", s.energy_gwh())?;
        }
        Ok(())
    }
}
