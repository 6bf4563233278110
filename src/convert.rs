//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};
use ndarray::Array2;

use crate::config::*;

use gridcast_distribute::DistributeConfig;
use gridcast_spatial::{
    Method, Mode, RasterGrid, StationSet, TrendConstraint, VariogramKind, VariogramModel,
};

/// Parses a distribution method name (`idw`, `dk`, `grid`, `kriging`).
pub fn parse_method(s: &str) -> Result<Method> {
    s.parse::<Method>()
        .with_context(|| format!("invalid distribution: {s:?}"))
}

/// Parses a triangulation interpolation mode (`nearest`, `linear`, `cubic`).
pub fn parse_mode(s: &str) -> Result<Mode> {
    s.parse::<Mode>()
        .with_context(|| format!("invalid grid_method: {s:?}"))
}

/// Converts the integer `detrend_slope` setting into a trend constraint.
pub fn parse_constraint(v: i64) -> Result<TrendConstraint> {
    TrendConstraint::try_from(v).context("invalid detrend_slope")
}

/// Builds a semivariogram from the `krig_*` keys of a variable.
pub fn parse_variogram(v: &VariableToml) -> Result<VariogramModel> {
    let kind = v
        .krig_variogram_model
        .parse::<VariogramKind>()
        .with_context(|| format!("invalid krig_variogram_model: {:?}", v.krig_variogram_model))?;
    Ok(VariogramModel::from_kind(
        kind,
        v.krig_nugget,
        v.krig_sill,
        v.krig_range,
        v.krig_slope,
    ))
}

/// Builds a [`DistributeConfig`] from one `[variables.<name>]` table.
pub fn build_distribute_config(v: &VariableToml) -> Result<DistributeConfig> {
    let method = parse_method(&v.distribution)?;
    let constraint = parse_constraint(v.detrend_slope)?;

    let mut cfg = DistributeConfig::new(method)
        .with_constraint(constraint)
        .with_idw_power(v.idw_power)
        .with_grid_mode(parse_mode(&v.grid_method)?)
        .with_grid_mask(v.grid_mask)
        .with_variogram(parse_variogram(v)?)
        .with_bounds(
            v.min.unwrap_or(f64::NEG_INFINITY),
            v.max.unwrap_or(f64::INFINITY),
        );
    if v.detrend {
        cfg = cfg.with_detrend(constraint);
    }
    if v.grid_local {
        cfg = cfg.with_local(v.grid_local_n);
    }
    if let Some(ref ids) = v.stations {
        cfg = cfg.with_stations(ids.clone());
    }
    cfg.validate().context("invalid variable configuration")?;
    Ok(cfg)
}

/// Builds the [`StationSet`] from the `[[stations]]` array.
pub fn build_stations(stations: &[StationToml]) -> Result<StationSet> {
    let set = StationSet::new(
        stations.iter().map(|s| s.id.clone()).collect(),
        stations.iter().map(|s| s.x).collect(),
        stations.iter().map(|s| s.y).collect(),
        stations.iter().map(|s| s.elevation).collect(),
    )
    .context("invalid station metadata")?;
    Ok(set)
}

/// Builds the [`RasterGrid`] from the `[topo]` table.
pub fn build_grid(topo: &TopoToml) -> Result<RasterGrid> {
    let dem = rows_to_array("dem", &topo.dem, topo.y.len(), topo.x.len())?;
    let mut grid = RasterGrid::from_axes(&topo.x, &topo.y, dem).context("invalid topo")?;
    if let Some(ref mask) = topo.mask {
        let mask = rows_to_array("mask", mask, topo.y.len(), topo.x.len())?;
        grid = grid.with_mask(mask).context("invalid topo mask")?;
    }
    Ok(grid)
}

fn rows_to_array<T: Copy>(name: &str, rows: &[Vec<T>], n_rows: usize, n_cols: usize) -> Result<Array2<T>> {
    if rows.len() != n_rows {
        bail!("topo.{name} has {} rows, expected {n_rows} (length of topo.y)", rows.len());
    }
    if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n_cols) {
        bail!(
            "topo.{name} row {r} has {} values, expected {n_cols} (length of topo.x)",
            row.len()
        );
    }
    let flat: Vec<T> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).with_context(|| format!("invalid topo.{name}"))
}
