//! Normalized standard load profile with two illumination regimes.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Illumination regime a feature is operated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Part-night operation: lights are switched off between roughly
    /// 00:00 and 05:15.
    #[serde(rename = "a", alias = "part_night")]
    A,
    /// All-night operation.
    #[serde(rename = "b", alias = "all_night")]
    B,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "a"),
            Self::B => write!(f, "b"),
        }
    }
}

/// One timestep of the standard load profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProfilePoint {
    pub timestamp: NaiveDateTime,
    /// Normalized load fraction for regime A, in `[0, 1]`.
    pub fraction_a: f64,
    /// Normalized load fraction for regime B, in `[0, 1]`.
    pub fraction_b: f64,
}

impl LoadProfilePoint {
    pub fn new(timestamp: NaiveDateTime, fraction_a: f64, fraction_b: f64) -> Self {
        Self {
            timestamp,
            fraction_a,
            fraction_b,
        }
    }

    /// Returns the fraction for `regime`.
    pub fn fraction(&self, regime: Regime) -> f64 {
        match regime {
            Regime::A => self.fraction_a,
            Regime::B => self.fraction_b,
        }
    }
}

/// A validated, chronologically ordered load profile.
///
/// Construction guarantees strictly increasing timestamps and fractions in
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    points: Vec<LoadProfilePoint>,
}

impl LoadProfile {
    /// Validates and wraps `points`.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Validation` naming the first offending row (1-based)
    /// if a fraction is outside `[0, 1]` or a timestamp does not strictly
    /// follow its predecessor.
    pub fn new(points: Vec<LoadProfilePoint>) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            let row = i + 1;
            for (regime, value) in [(Regime::A, p.fraction_a), (Regime::B, p.fraction_b)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(SimError::at_row(
                        row,
                        format!("regime {regime} fraction {value} is outside [0, 1]"),
                    ));
                }
            }
            if i > 0 && p.timestamp <= points[i - 1].timestamp {
                return Err(SimError::at_row(
                    row,
                    format!(
                        "timestamp {} does not follow {}",
                        p.timestamp,
                        points[i - 1].timestamp
                    ),
                ));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[LoadProfilePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Duration of one timestep in hours, taken from the first two points.
    ///
    /// Single-point profiles are treated as hourly.
    pub fn step_hours(&self) -> f64 {
        match self.points.as_slice() {
            [first, second, ..] => {
                (second.timestamp - first.timestamp).num_seconds() as f64 / 3600.0
            }
            _ => 1.0,
        }
    }
}
