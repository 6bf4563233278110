use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use gridcast_distribute::Distribution;
use gridcast_spatial::{RasterGrid, StationSet};

use crate::cli::CheckArgs;
use crate::config::{self, GridcastConfig};
use crate::convert;

/// Stations, grid and one initialised distribution per variable.
pub struct Project {
    pub stations: StationSet,
    pub grid: RasterGrid,
    pub distributions: Vec<Distribution>,
}

/// Builds the station set, the grid and every variable's distribution.
pub fn initialize(config: &GridcastConfig) -> Result<Project> {
    let stations = convert::build_stations(&config.stations)?;
    let grid = convert::build_grid(&config.topo)?;
    info!(
        n_stations = stations.len(),
        rows = grid.shape().0,
        cols = grid.shape().1,
        "topo loaded"
    );

    if config.variables.is_empty() {
        bail!("no variables configured: add at least one [variables.<name>] table");
    }

    let distributions = config
        .variables
        .iter()
        .map(|(name, v)| {
            let cfg = convert::build_distribute_config(v)
                .with_context(|| format!("variable {name:?}"))?;
            Distribution::initialize(name, cfg, &stations, &grid)
                .with_context(|| format!("failed to initialise variable {name:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Project {
        stations,
        grid,
        distributions,
    })
}

/// Checks that every step only names configured variables.
pub fn check_steps(config: &GridcastConfig) -> Result<()> {
    for step in &config.steps {
        if let Some(name) = step
            .values
            .keys()
            .find(|name| !config.variables.contains_key(*name))
        {
            bail!("step {:?} has values for unknown variable {name:?}", step.label);
        }
    }
    Ok(())
}

/// Validate the configuration and initialise every variable.
pub fn run(args: CheckArgs) -> Result<()> {
    let _cmd = info_span!("check").entered();
    let config = config::load(&args.config)?;

    let project = initialize(&config)?;
    check_steps(&config)?;

    let (rows, cols) = project.grid.shape();
    println!(
        "{}: {} stations, {rows}x{cols} grid, {} steps",
        args.config.display(),
        project.stations.len(),
        config.steps.len()
    );
    for d in &project.distributions {
        println!(
            "  {:<16} {:<8} {} stations",
            d.name(),
            d.method().as_str(),
            d.stations().len()
        );
    }
    Ok(())
}
