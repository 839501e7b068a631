//! Road-infrastructure features and area aggregation.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical source of a feature row.
///
/// Linear road segments carry an area derived upstream from length times a
/// per-category width; polygons (squares, plazas) carry their own area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Line,
    Polygon,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Polygon => write!(f, "polygon"),
        }
    }
}

/// A single road feature with its illuminated area.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// OSM `highway` tag, e.g. `"motorway"` or `"footway"`.
    pub category: String,
    /// Area in square metres.
    pub area: f64,
    /// Which source table the feature came from.
    pub kind: FeatureKind,
}

impl Feature {
    pub fn new(category: impl Into<String>, area: f64, kind: FeatureKind) -> Self {
        Self {
            category: category.into(),
            area,
            kind,
        }
    }

    /// Shorthand for a linear road segment.
    pub fn line(category: impl Into<String>, area: f64) -> Self {
        Self::new(category, area, FeatureKind::Line)
    }

    /// Shorthand for an areal feature.
    pub fn polygon(category: impl Into<String>, area: f64) -> Self {
        Self::new(category, area, FeatureKind::Polygon)
    }
}

/// Sums the area of every feature whose category is in `categories`.
///
/// Categories that never occur in `features` contribute nothing, so an empty
/// intersection yields `0.0`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use streetlight_sim::features::{Feature, aggregate_area};
///
/// let features = vec![Feature::line("motorway", 150.0), Feature::line("footway", 20.0)];
/// let main: BTreeSet<String> = ["motorway".to_string()].into();
/// assert_eq!(aggregate_area(&features, &main), 150.0);
/// assert_eq!(aggregate_area(&features, &BTreeSet::new()), 0.0);
/// ```
pub fn aggregate_area(features: &[Feature], categories: &BTreeSet<String>) -> f64 {
    features
        .iter()
        .filter(|f| categories.contains(&f.category))
        .map(|f| f.area)
        .sum()
}

/// Sums the area of every feature regardless of category.
pub fn total_area(features: &[Feature]) -> f64 {
    features.iter().map(|f| f.area).sum()
}

/// Distinct categories present in `features`.
pub fn categories(features: &[Feature]) -> BTreeSet<String> {
    features.iter().map(|f| f.category.clone()).collect()
}
