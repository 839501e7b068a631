//! Illumination scenarios: which features run under which regime.

/// Area aggregation and per-timestep load computation.
pub mod engine;
pub mod series;

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::config::ConfigError;
use crate::features::{Feature, FeatureKind};
use crate::profile::Regime;

pub use engine::{
    AreaTerm, ScenarioAreas, ScenarioLoadEngine, compute_scenario_series, scenario_areas,
};
pub use series::{LoadUnit, ScenarioLoadSeries, ScenarioSeries, Truncation};

/// Named category sets, e.g. `main_roads -> {motorway, primary, ...}`.
pub type CategorySets = BTreeMap<String, BTreeSet<String>>;

/// Picks the features a scenario component applies to.
///
/// A feature matches when its kind is accepted (an empty `kinds` list
/// accepts all), its category is in `include_set` when one is given, and its
/// category is not in `exclude_set` when one is given.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategorySelector {
    pub kinds: Vec<FeatureKind>,
    pub include_set: Option<String>,
    pub exclude_set: Option<String>,
}

impl CategorySelector {
    /// Selects every feature.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the selector to one feature kind.
    pub fn of_kind(mut self, kind: FeatureKind) -> Self {
        self.kinds = vec![kind];
        self
    }

    pub fn including(mut self, set: impl Into<String>) -> Self {
        self.include_set = Some(set.into());
        self
    }

    pub fn excluding(mut self, set: impl Into<String>) -> Self {
        self.exclude_set = Some(set.into());
        self
    }

    /// Looks up the referenced sets.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming `field` if a referenced set is undefined.
    pub fn resolve<'a>(
        &'a self,
        sets: &'a CategorySets,
        field: &str,
    ) -> Result<ResolvedSelector<'a>, ConfigError> {
        let lookup = |name: &Option<String>, key: &str| -> Result<_, ConfigError> {
            match name {
                None => Ok(None),
                Some(n) => sets.get(n).map(Some).ok_or_else(|| ConfigError {
                    field: format!("{field}.{key}"),
                    message: format!("unknown category set \"{n}\""),
                }),
            }
        };
        Ok(ResolvedSelector {
            kinds: &self.kinds,
            include: lookup(&self.include_set, "include_set")?,
            exclude: lookup(&self.exclude_set, "exclude_set")?,
        })
    }
}

/// A selector with its category sets looked up.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSelector<'a> {
    kinds: &'a [FeatureKind],
    include: Option<&'a BTreeSet<String>>,
    exclude: Option<&'a BTreeSet<String>>,
}

impl ResolvedSelector<'_> {
    pub fn matches(&self, feature: &Feature) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&feature.kind))
            && self.include.is_none_or(|s| s.contains(&feature.category))
            && !self.exclude.is_some_and(|s| s.contains(&feature.category))
    }

    /// Sums the area of matching features; no match yields `0.0`.
    pub fn area(&self, features: &[Feature]) -> f64 {
        features
            .iter()
            .filter(|f| self.matches(f))
            .map(|f| f.area)
            .sum()
    }
}

/// One additive term of a scenario: selected features lit under `regime`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioComponent {
    pub regime: Regime,
    /// Omitted selectors select every feature.
    #[serde(default)]
    pub selector: CategorySelector,
}

impl ScenarioComponent {
    pub fn new(regime: Regime, selector: CategorySelector) -> Self {
        Self { regime, selector }
    }
}

/// A named illumination policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDefinition {
    pub name: String,
    pub components: Vec<ScenarioComponent>,
}

impl ScenarioDefinition {
    pub fn new(name: impl Into<String>, components: Vec<ScenarioComponent>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Every feature under a single regime.
    pub fn uniform(name: impl Into<String>, regime: Regime) -> Self {
        Self::new(
            name,
            vec![ScenarioComponent::new(regime, CategorySelector::all())],
        )
    }
}
