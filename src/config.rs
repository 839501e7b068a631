//! TOML-based run configuration and preset definitions.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::features::FeatureKind;
use crate::profile::Regime;
use crate::scenario::{
    CategorySelector, CategorySets, LoadUnit, ScenarioComponent, ScenarioDefinition,
};

/// Roads lit all night in the main-road scenarios.
pub const MAIN_ROADS: &[&str] = &[
    "living_street",
    "motorway",
    "pedestrian",
    "primary",
    "secondary",
    "service",
    "tertiary",
    "trunk",
];

/// Top-level run configuration parsed from TOML.
///
/// Every section has defaults matching the baseline preset, so a partial
/// file only needs to name what it changes. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use [`ScenarioConfig::baseline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Usage index, horizon and output unit.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Feature tables to union before aggregation.
    #[serde(default = "default_feature_sources")]
    pub feature_sources: Vec<FeatureSourceConfig>,
    /// Load profile table layout.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Scenario table formatting.
    #[serde(default)]
    pub output: OutputConfig,
    /// Plot-ready window export.
    #[serde(default)]
    pub report: ReportConfig,
    /// Named category sets referenced by scenario selectors.
    #[serde(default = "baseline_category_sets")]
    pub category_sets: CategorySets,
    /// Illumination scenarios, in output column order.
    #[serde(default = "baseline_scenarios")]
    pub scenarios: Vec<ScenarioDefinition>,
}

/// Engine parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Electricity usage index per unit area (must be > 0).
    pub usage_index: f64,
    /// Number of timesteps the run expects; the profile is cut to match.
    pub expected_steps: Option<usize>,
    /// Unit declared for every value in the output table.
    pub unit: LoadUnit,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            usage_index: 0.01464,
            expected_steps: None,
            unit: LoadUnit::Kw,
        }
    }
}

/// Input and output locations, relative to the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Standard load profile table.
    pub profile: PathBuf,
    /// Optional renewable feed-in table (`time,pv,wind`).
    pub feedin: Option<PathBuf>,
    /// Directory receiving every output file.
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("data/01_raw_input_data/SLP.csv"),
            feedin: None,
            output_dir: PathBuf::from("data/03_urban_energy_requirements"),
        }
    }
}

/// One feature table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSourceConfig {
    pub path: PathBuf,
    pub kind: FeatureKind,
    /// Column holding the category tag.
    #[serde(default = "default_category_column")]
    pub category_column: String,
    #[serde(default = "default_area_column")]
    pub area_column: String,
}

impl FeatureSourceConfig {
    pub fn new(path: impl Into<PathBuf>, kind: FeatureKind) -> Self {
        Self {
            path: path.into(),
            kind,
            category_column: default_category_column(),
            area_column: default_area_column(),
        }
    }
}

fn default_category_column() -> String {
    "highway".to_string()
}

fn default_area_column() -> String {
    "area".to_string()
}

fn default_feature_sources() -> Vec<FeatureSourceConfig> {
    vec![
        FeatureSourceConfig::new(
            "data/02_urban_output_data/planet_osm_line.csv",
            FeatureKind::Line,
        ),
        FeatureSourceConfig::new(
            "data/02_urban_output_data/planet_osm_polygon.csv",
            FeatureKind::Polygon,
        ),
    ]
}

/// Load profile table layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub delimiter: char,
    pub timestamp_column: String,
    pub regime_a_column: String,
    pub regime_b_column: String,
    /// Stored values are divided by this factor to obtain fractions.
    pub scale: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            timestamp_column: "timestamp".to_string(),
            regime_a_column: "regime_a".to_string(),
            regime_b_column: "regime_b".to_string(),
            scale: 1000.0,
        }
    }
}

/// Scenario table formatting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub file_name: String,
    pub delimiter: char,
    /// `'.'` or `','`.
    pub decimal_separator: char,
    /// Digits after the decimal separator.
    pub precision: usize,
    /// Joined feed-in/demand table, written when `paths.feedin` is set.
    pub commodities_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "streetlight_load.csv".to_string(),
            delimiter: ';',
            decimal_separator: '.',
            precision: 6,
            commodities_file_name: "optimization-commodities.csv".to_string(),
        }
    }
}

/// Date range exported as a plot-ready table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// First day of the window (inclusive), e.g. `"2014-01-01"`.
    pub window_start: Option<NaiveDate>,
    /// Last day of the window (inclusive).
    pub window_end: Option<NaiveDate>,
    pub file_name: Option<String>,
}

impl ReportConfig {
    /// Output file name for the window table.
    pub fn window_file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("streetlight_load_window.csv")
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.usage_index"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

fn baseline_category_sets() -> CategorySets {
    let mut sets = CategorySets::new();
    sets.insert(
        "main_roads".to_string(),
        MAIN_ROADS.iter().map(|c| c.to_string()).collect(),
    );
    sets
}

fn baseline_scenarios() -> Vec<ScenarioDefinition> {
    vec![
        ScenarioDefinition::uniform("all_part_night", Regime::A),
        ScenarioDefinition::uniform("all_night", Regime::B),
        main_roads_scenario("main_roads_all_night", Regime::B),
    ]
}

/// Main-road lines all night, other lines part-night, squares on `squares`.
fn main_roads_scenario(name: &str, squares: Regime) -> ScenarioDefinition {
    ScenarioDefinition::new(
        name,
        vec![
            ScenarioComponent::new(
                Regime::B,
                CategorySelector::all()
                    .of_kind(FeatureKind::Line)
                    .including("main_roads"),
            ),
            ScenarioComponent::new(
                squares,
                CategorySelector::all().of_kind(FeatureKind::Polygon),
            ),
            ScenarioComponent::new(
                Regime::A,
                CategorySelector::all()
                    .of_kind(FeatureKind::Line)
                    .excluding("main_roads"),
            ),
        ],
    )
}

impl ScenarioConfig {
    /// Returns the baseline configuration: everything part-night, everything
    /// all-night, and main roads plus squares all-night.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            paths: PathsConfig::default(),
            feature_sources: default_feature_sources(),
            profile: ProfileConfig::default(),
            output: OutputConfig::default(),
            report: ReportConfig::default(),
            category_sets: baseline_category_sets(),
            scenarios: baseline_scenarios(),
        }
    }

    /// Returns the baseline with squares kept part-night in the main-road
    /// scenario.
    pub fn squares_part_night() -> Self {
        Self {
            scenarios: vec![
                ScenarioDefinition::uniform("all_part_night", Regime::A),
                ScenarioDefinition::uniform("all_night", Regime::B),
                main_roads_scenario("main_roads_all_night_squares_part_night", Regime::A),
            ],
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "squares_part_night"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "squares_part_night" => Ok(Self::squares_part_night()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: String| errors.push(ConfigError { field, message });

        let s = &self.simulation;
        if !s.usage_index.is_finite() || s.usage_index <= 0.0 {
            push("simulation.usage_index".into(), "must be > 0".into());
        }
        if s.expected_steps == Some(0) {
            push("simulation.expected_steps".into(), "must be > 0".into());
        }

        if self.feature_sources.is_empty() {
            push("feature_sources".into(), "must not be empty".into());
        }

        let p = &self.profile;
        if !p.delimiter.is_ascii() {
            push("profile.delimiter".into(), "must be an ASCII character".into());
        }
        if !p.scale.is_finite() || p.scale <= 0.0 {
            push("profile.scale".into(), "must be > 0".into());
        }

        let o = &self.output;
        if !o.delimiter.is_ascii() {
            push("output.delimiter".into(), "must be an ASCII character".into());
        }
        if o.decimal_separator != '.' && o.decimal_separator != ',' {
            push(
                "output.decimal_separator".into(),
                format!("must be '.' or ',', got '{}'", o.decimal_separator),
            );
        }
        if o.decimal_separator == o.delimiter {
            push(
                "output.decimal_separator".into(),
                "must differ from output.delimiter".into(),
            );
        }
        if o.file_name.is_empty() {
            push("output.file_name".into(), "must not be empty".into());
        }
        if self.paths.feedin.is_some() && o.commodities_file_name.is_empty() {
            push(
                "output.commodities_file_name".into(),
                "must not be empty when paths.feedin is set".into(),
            );
        }

        let r = &self.report;
        match (r.window_start, r.window_end) {
            (Some(start), Some(end)) if start > end => {
                push("report.window_start".into(), "must be <= report.window_end".into());
            }
            (Some(_), None) | (None, Some(_)) => {
                push(
                    "report.window_start".into(),
                    "window_start and window_end must be set together".into(),
                );
            }
            _ => {}
        }

        if self.scenarios.is_empty() {
            push("scenarios".into(), "must not be empty".into());
        }
        let mut seen = BTreeSet::new();
        for (si, def) in self.scenarios.iter().enumerate() {
            if def.name.trim().is_empty() || def.name.eq_ignore_ascii_case("time") {
                push(
                    format!("scenarios[{si}].name"),
                    format!("\"{}\" is not a usable column name", def.name),
                );
            }
            if !seen.insert(def.name.as_str()) {
                push(
                    format!("scenarios[{si}].name"),
                    format!("duplicate scenario \"{}\"", def.name),
                );
            }
            if def.components.is_empty() {
                push(
                    format!("scenarios[{si}].components"),
                    "must not be empty".into(),
                );
            }
            for (ci, component) in def.components.iter().enumerate() {
                let field = format!("scenarios[{si}].components[{ci}].selector");
                if let Err(e) = component.selector.resolve(&self.category_sets, &field) {
                    push(e.field, e.message);
                }
            }
        }

        errors
    }
}
