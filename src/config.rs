use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<GridcastConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Top-level Gridcast configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridcastConfig {
    /// Output grid and elevation model.
    pub topo: TopoToml,

    /// Station metadata.
    pub stations: Vec<StationToml>,

    /// Per-variable distribution settings, keyed by variable name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableToml>,

    /// Measurement rows, one per time step.
    #[serde(default)]
    pub steps: Vec<StepToml>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,
}

/// Grid axes, DEM rows and optional detrending mask.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopoToml {
    /// Column x coordinates.
    pub x: Vec<f64>,
    /// Row y coordinates.
    pub y: Vec<f64>,
    /// Elevation, one inner array per row.
    pub dem: Vec<Vec<f64>>,
    /// Cells used for global detrending, same layout as `dem`.
    #[serde(default)]
    pub mask: Option<Vec<Vec<bool>>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationToml {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableToml {
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default)]
    pub detrend: bool,
    #[serde(default)]
    pub detrend_slope: i64,
    #[serde(default = "default_grid_method")]
    pub grid_method: String,
    #[serde(default)]
    pub grid_local: bool,
    #[serde(default = "default_grid_local_n")]
    pub grid_local_n: usize,
    #[serde(default)]
    pub grid_mask: bool,
    #[serde(default = "default_idw_power")]
    pub idw_power: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub stations: Option<Vec<String>>,
    #[serde(default = "default_variogram_model")]
    pub krig_variogram_model: String,
    #[serde(default)]
    pub krig_nugget: f64,
    #[serde(default = "default_krig_sill")]
    pub krig_sill: f64,
    #[serde(default = "default_krig_range")]
    pub krig_range: f64,
    #[serde(default = "default_krig_slope")]
    pub krig_slope: f64,
}

impl Default for VariableToml {
    fn default() -> Self {
        Self {
            distribution: default_distribution(),
            detrend: false,
            detrend_slope: 0,
            grid_method: default_grid_method(),
            grid_local: false,
            grid_local_n: default_grid_local_n(),
            grid_mask: false,
            idw_power: default_idw_power(),
            min: None,
            max: None,
            stations: None,
            krig_variogram_model: default_variogram_model(),
            krig_nugget: 0.0,
            krig_sill: default_krig_sill(),
            krig_range: default_krig_range(),
            krig_slope: default_krig_slope(),
        }
    }
}

fn default_distribution() -> String {
    "idw".to_string()
}
fn default_grid_method() -> String {
    "linear".to_string()
}
fn default_grid_local_n() -> usize {
    gridcast_distribute::DEFAULT_LOCAL_N
}
fn default_idw_power() -> f64 {
    gridcast_spatial::DEFAULT_POWER
}
fn default_variogram_model() -> String {
    "linear".to_string()
}
fn default_krig_sill() -> f64 {
    1.0
}
fn default_krig_range() -> f64 {
    1000.0
}
fn default_krig_slope() -> f64 {
    1.0
}

/// One time step of station measurements.
///
/// `values` maps variable name to a table of station id to value. A
/// station missing from the table, or given as `nan`, has no data.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepToml {
    pub label: String,
    #[serde(default)]
    pub values: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    pub path: Option<PathBuf>,
    /// Include full rasters, not only summary statistics.
    #[serde(default = "default_true")]
    pub rasters: bool,
}

fn default_true() -> bool {
    true
}
