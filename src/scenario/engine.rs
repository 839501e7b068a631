//! Area resolution per scenario and the per-timestep load computation.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::error::{Result, SimError};
use crate::features::Feature;
use crate::profile::{LoadProfile, Regime};

use super::series::{LoadUnit, ScenarioLoadSeries, ScenarioSeries, Truncation};
use super::{CategorySets, ScenarioDefinition};

/// Total area lit under one regime within a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaTerm {
    pub regime: Regime,
    pub area: f64,
}

/// Resolved area terms of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAreas {
    pub name: String,
    pub terms: Vec<AreaTerm>,
}

impl ScenarioAreas {
    pub fn new(name: impl Into<String>, terms: Vec<AreaTerm>) -> Self {
        Self {
            name: name.into(),
            terms,
        }
    }

    /// Sum of all term areas.
    pub fn total_area(&self) -> f64 {
        self.terms.iter().map(|t| t.area).sum()
    }

    /// Load at one timestep given the regime fractions at that timestep.
    fn load_at(&self, fraction: impl Fn(Regime) -> f64, usage_index: f64) -> f64 {
        self.terms
            .iter()
            .map(|t| t.area * fraction(t.regime) * usage_index)
            .sum()
    }
}

/// Resolves every scenario definition into area terms.
///
/// Categories referenced by a definition but absent from `features`
/// contribute zero area.
///
/// # Errors
///
/// Returns `SimError::Validation` naming the 1-based feature row if any area
/// is negative or not finite, and `SimError::Config` if a component refers to
/// an undefined category set.
pub fn scenario_areas(
    features: &[Feature],
    definitions: &[ScenarioDefinition],
    sets: &CategorySets,
) -> Result<Vec<ScenarioAreas>> {
    validate_features(features)?;

    let mut errors: Vec<ConfigError> = Vec::new();
    let mut out = Vec::with_capacity(definitions.len());
    for (si, def) in definitions.iter().enumerate() {
        let mut terms = Vec::with_capacity(def.components.len());
        for (ci, component) in def.components.iter().enumerate() {
            let field = format!("scenarios[{si}].components[{ci}].selector");
            match component.selector.resolve(sets, &field) {
                Ok(selector) => terms.push(AreaTerm {
                    regime: component.regime,
                    area: selector.area(features),
                }),
                Err(e) => errors.push(e),
            }
        }
        let areas = ScenarioAreas::new(def.name.clone(), terms);
        debug!(
            scenario = %areas.name,
            total_area_m2 = areas.total_area(),
            terms = areas.terms.len(),
            "resolved scenario areas"
        );
        out.push(areas);
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(SimError::Config(errors))
    }
}

fn validate_features(features: &[Feature]) -> Result<()> {
    for (i, f) in features.iter().enumerate() {
        if !f.area.is_finite() || f.area < 0.0 {
            return Err(SimError::at_row(
                i + 1,
                format!(
                    "{} feature \"{}\" has invalid area {}",
                    f.kind, f.category, f.area
                ),
            ));
        }
    }
    Ok(())
}

/// Computes per-timestep load for every scenario.
///
/// For timestep `t` and scenario `s`:
/// `load[s][t] = Σ term.area * fraction(term.regime)[t] * usage_index`.
///
/// When `expected_steps` is given and differs from the profile length, the
/// longer side is cut to the shorter one, a warning is logged, and the
/// returned series carries a [`Truncation`] record.
///
/// # Errors
///
/// Returns `SimError::Validation` if `usage_index` is not a positive finite
/// number or any area term is negative.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use streetlight_sim::profile::{LoadProfile, LoadProfilePoint, Regime};
/// use streetlight_sim::scenario::{AreaTerm, LoadUnit, ScenarioAreas, compute_scenario_series};
///
/// let t0 = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let profile = LoadProfile::new(vec![LoadProfilePoint::new(t0, 0.2, 0.1)]).unwrap();
/// let mixed = ScenarioAreas::new(
///     "mixed",
///     vec![
///         AreaTerm { regime: Regime::B, area: 600.0 },
///         AreaTerm { regime: Regime::A, area: 400.0 },
///     ],
/// );
/// let out = compute_scenario_series(&profile, &[mixed], 0.004, None, LoadUnit::Kw).unwrap();
/// assert!((out.get("mixed").unwrap()[0] - 0.56).abs() < 1e-12);
/// ```
pub fn compute_scenario_series(
    profile: &LoadProfile,
    areas_by_scenario: &[ScenarioAreas],
    usage_index: f64,
    expected_steps: Option<usize>,
    unit: LoadUnit,
) -> Result<ScenarioLoadSeries> {
    if !usage_index.is_finite() || usage_index <= 0.0 {
        return Err(SimError::invalid(format!(
            "usage index must be a positive number, got {usage_index}"
        )));
    }
    for areas in areas_by_scenario {
        if let Some(t) = areas
            .terms
            .iter()
            .find(|t| !t.area.is_finite() || t.area < 0.0)
        {
            return Err(SimError::invalid(format!(
                "scenario \"{}\" has invalid regime {} area {}",
                areas.name, t.regime, t.area
            )));
        }
    }

    let (steps, truncation) = effective_steps(profile.len(), expected_steps);
    let points = &profile.points()[..steps];

    let series = areas_by_scenario
        .iter()
        .map(|areas| ScenarioSeries {
            name: areas.name.clone(),
            values: points
                .iter()
                .map(|p| areas.load_at(|r| p.fraction(r), usage_index))
                .collect(),
        })
        .collect();

    info!(
        steps,
        scenarios = areas_by_scenario.len(),
        %unit,
        "computed scenario load series"
    );

    Ok(ScenarioLoadSeries {
        timestamps: points.iter().map(|p| p.timestamp).collect(),
        unit,
        series,
        truncation,
    })
}

fn effective_steps(profile_len: usize, expected: Option<usize>) -> (usize, Option<Truncation>) {
    match expected {
        Some(expected_len) if expected_len != profile_len => {
            let used_len = profile_len.min(expected_len);
            warn!(
                profile_len,
                expected_len, used_len, "load profile length differs from configured timesteps; truncating"
            );
            (
                used_len,
                Some(Truncation {
                    profile_len,
                    expected_len,
                    used_len,
                }),
            )
        }
        _ => (profile_len, None),
    }
}

/// Immutable engine settings bundled for repeated use.
///
/// Holds no state between runs; [`ScenarioLoadEngine::run`] is a pure
/// function of its arguments and these settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioLoadEngine {
    pub usage_index: f64,
    pub expected_steps: Option<usize>,
    pub unit: LoadUnit,
}

impl ScenarioLoadEngine {
    pub fn new(usage_index: f64, expected_steps: Option<usize>, unit: LoadUnit) -> Self {
        Self {
            usage_index,
            expected_steps,
            unit,
        }
    }

    /// Resolves scenario areas and computes their load series.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`scenario_areas`] and
    /// [`compute_scenario_series`].
    pub fn run(
        &self,
        features: &[Feature],
        profile: &LoadProfile,
        definitions: &[ScenarioDefinition],
        sets: &CategorySets,
    ) -> Result<(Vec<ScenarioAreas>, ScenarioLoadSeries)> {
        let areas = scenario_areas(features, definitions, sets)?;
        let series = compute_scenario_series(
            profile,
            &areas,
            self.usage_index,
            self.expected_steps,
            self.unit,
        )?;
        Ok((areas, series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureKind;
    use crate::profile::LoadProfilePoint;
    use crate::scenario::{CategorySelector, ScenarioComponent};
    use crate::telemetry::capture_logs;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp")
    }

    fn profile(fractions: &[(f64, f64)]) -> LoadProfile {
        let points = fractions
            .iter()
            .enumerate()
            .map(|(i, &(a, b))| {
                LoadProfilePoint::new(t0() + Duration::minutes(15 * i as i64), a, b)
            })
            .collect();
        LoadProfile::new(points).expect("valid profile")
    }

    fn uniform(name: &str, regime: Regime, area: f64) -> ScenarioAreas {
        ScenarioAreas::new(name, vec![AreaTerm { regime, area }])
    }

    #[test]
    fn all_regime_a_matches_formula() {
        let p = profile(&[(0.1, 0.9), (0.2, 0.9)]);
        let out = compute_scenario_series(
            &p,
            &[uniform("a", Regime::A, 1000.0)],
            0.004,
            None,
            LoadUnit::Kw,
        )
        .expect("series computes");
        let values = out.get("a").expect("scenario present");
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.4).abs() < 1e-12);
        assert!((values[1] - 0.8).abs() < 1e-12);
        assert!(out.truncation.is_none());
    }

    #[test]
    fn mixed_regime_sums_terms() {
        let p = profile(&[(0.2, 0.1)]);
        let mixed = ScenarioAreas::new(
            "mixed",
            vec![
                AreaTerm {
                    regime: Regime::B,
                    area: 600.0,
                },
                AreaTerm {
                    regime: Regime::A,
                    area: 400.0,
                },
            ],
        );
        let out = compute_scenario_series(&p, &[mixed], 0.004, None, LoadUnit::Kw)
            .expect("series computes");
        assert!((out.get("mixed").expect("present")[0] - 0.56).abs() < 1e-12);
    }

    #[test]
    fn matching_horizon_is_not_truncated() {
        let p = profile(&[(0.5, 0.5); 10]);
        let out = compute_scenario_series(
            &p,
            &[uniform("a", Regime::A, 10.0)],
            1.0,
            Some(10),
            LoadUnit::Kw,
        )
        .expect("series computes");
        assert_eq!(out.len(), 10);
        assert!(out.truncation.is_none());
    }

    #[test]
    fn matching_horizon_logs_no_warning() {
        let p = profile(&[(0.5, 0.5); 10]);
        let areas = [uniform("a", Regime::A, 10.0)];
        let (out, logs) = capture_logs(|| {
            compute_scenario_series(&p, &areas, 1.0, Some(10), LoadUnit::Kw)
        });
        assert!(out.is_ok());
        assert!(!logs.contains("WARN"), "logs: {logs}");
        assert!(!logs.contains("truncating"), "logs: {logs}");
    }

    #[test]
    fn short_profile_logs_warning() {
        let p = profile(&[(0.5, 0.5); 8]);
        let areas = [uniform("a", Regime::A, 10.0)];
        let (out, logs) = capture_logs(|| {
            compute_scenario_series(&p, &areas, 1.0, Some(10), LoadUnit::Kw)
        });
        assert_eq!(out.map(|s| s.len()).ok(), Some(8));
        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(
            logs.contains("load profile length differs from configured timesteps; truncating"),
            "logs: {logs}"
        );
        assert!(logs.contains("profile_len=8"), "logs: {logs}");
        assert!(logs.contains("expected_len=10"), "logs: {logs}");
    }

    #[test]
    fn short_profile_truncates_and_records() {
        let p = profile(&[(0.5, 0.5); 8]);
        let out = compute_scenario_series(
            &p,
            &[uniform("a", Regime::A, 10.0)],
            1.0,
            Some(10),
            LoadUnit::Kw,
        )
        .expect("series computes");
        assert_eq!(out.len(), 8);
        assert_eq!(out.get("a").map(<[f64]>::len), Some(8));
        assert_eq!(
            out.truncation,
            Some(Truncation {
                profile_len: 8,
                expected_len: 10,
                used_len: 8
            })
        );
    }

    #[test]
    fn long_profile_is_cut_to_horizon() {
        let p = profile(&[(0.5, 0.5); 12]);
        let out = compute_scenario_series(
            &p,
            &[uniform("a", Regime::A, 10.0)],
            1.0,
            Some(10),
            LoadUnit::Kwh,
        )
        .expect("series computes");
        assert_eq!(out.len(), 10);
        assert_eq!(out.timestamps.last().copied(), Some(t0() + Duration::minutes(135)));
        assert_eq!(out.truncation.map(|t| t.used_len), Some(10));
    }

    #[test]
    fn non_positive_usage_index_fails() {
        let p = profile(&[(0.5, 0.5)]);
        for index in [0.0, -0.004, f64::NAN] {
            let err = compute_scenario_series(
                &p,
                &[uniform("a", Regime::A, 10.0)],
                index,
                None,
                LoadUnit::Kw,
            )
            .expect_err("bad usage index must fail");
            assert!(matches!(err, SimError::Validation { .. }));
        }
    }

    #[test]
    fn negative_area_term_fails() {
        let p = profile(&[(0.5, 0.5)]);
        let err = compute_scenario_series(
            &p,
            &[uniform("a", Regime::A, -1.0)],
            1.0,
            None,
            LoadUnit::Kw,
        )
        .expect_err("negative area must fail");
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn negative_feature_area_names_row() {
        let features = vec![Feature::line("primary", 10.0), Feature::line("trunk", -5.0)];
        let defs = vec![ScenarioDefinition::uniform("all", Regime::B)];
        let err = scenario_areas(&features, &defs, &CategorySets::new())
            .expect_err("negative area must fail");
        assert!(matches!(err, SimError::Validation { row: Some(2), .. }));
        assert!(err.to_string().contains("trunk"));
    }

    #[test]
    fn scenario_areas_follow_definitions() {
        let mut sets = CategorySets::new();
        sets.insert("main_roads".into(), ["motorway".to_string()].into());
        let features = vec![
            Feature::line("motorway", 600.0),
            Feature::line("footway", 100.0),
            Feature::polygon("pedestrian", 300.0),
        ];
        let defs = vec![ScenarioDefinition::new(
            "main_roads_all_night",
            vec![
                ScenarioComponent::new(
                    Regime::B,
                    CategorySelector::all()
                        .of_kind(FeatureKind::Line)
                        .including("main_roads"),
                ),
                ScenarioComponent::new(
                    Regime::B,
                    CategorySelector::all().of_kind(FeatureKind::Polygon),
                ),
                ScenarioComponent::new(
                    Regime::A,
                    CategorySelector::all()
                        .of_kind(FeatureKind::Line)
                        .excluding("main_roads"),
                ),
            ],
        )];
        let areas = scenario_areas(&features, &defs, &sets).expect("areas resolve");
        let terms: Vec<(Regime, f64)> = areas[0].terms.iter().map(|t| (t.regime, t.area)).collect();
        assert_eq!(
            terms,
            vec![(Regime::B, 600.0), (Regime::B, 300.0), (Regime::A, 100.0)]
        );
        assert_eq!(areas[0].total_area(), 1000.0);
    }

    #[test]
    fn unknown_category_set_is_reported_per_component() {
        let defs = vec![ScenarioDefinition::new(
            "x",
            vec![ScenarioComponent::new(
                Regime::A,
                CategorySelector::all().including("nope"),
            )],
        )];
        let err = scenario_areas(&[], &defs, &CategorySets::new()).expect_err("must fail");
        match err {
            SimError::Config(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors[0].field,
                    "scenarios[0].components[0].selector.include_set"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn engine_run_is_idempotent() {
        let engine = ScenarioLoadEngine::new(0.01464, None, LoadUnit::Kw);
        let features = vec![Feature::line("primary", 1234.5), Feature::polygon("pedestrian", 77.25)];
        let p = profile(&[(0.013, 0.021), (0.0, 0.021), (0.007, 0.019)]);
        let defs = vec![
            ScenarioDefinition::uniform("all_part_night", Regime::A),
            ScenarioDefinition::uniform("all_night", Regime::B),
        ];
        let sets = CategorySets::new();
        let (_, first) = engine.run(&features, &p, &defs, &sets).expect("first run");
        let (_, second) = engine.run(&features, &p, &defs, &sets).expect("second run");
        for (a, b) in first.series.iter().zip(&second.series) {
            let bits_a: Vec<u64> = a.values.iter().map(|v| v.to_bits()).collect();
            let bits_b: Vec<u64> = b.values.iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits_a, bits_b);
        }
        assert_eq!(first.timestamps, second.timestamps);
    }
}
