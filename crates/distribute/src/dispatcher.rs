//! Per-variable distribution dispatcher.

use std::collections::HashMap;

use gridcast_spatial::{
    DetrendedKriging, GridInterpolator, Idw, Kriging, Method, RasterGrid, StationSet, Strategy,
    snap_station_mask,
};
use ndarray::Array2;
use tracing::{debug, info};

use crate::config::DistributeConfig;
use crate::error::DistributeError;

/// Distributes one physical variable from stations onto the grid.
///
/// The strategy and all of its cached geometry are built once by
/// [`Distribution::initialize`]; each [`Distribution::distribute`] call
/// interpolates one step and keeps the result as the current output.
#[derive(Debug, Clone)]
pub struct Distribution {
    name: String,
    config: DistributeConfig,
    stations: StationSet,
    strategy: Strategy,
    output: Option<Array2<f64>>,
    variance: Option<Array2<f64>>,
}

impl Distribution {
    /// Validates `config`, selects the station subset and builds the strategy.
    ///
    /// With a configured subset the stations are used in alphabetical id
    /// order; otherwise all stations in their given order.
    ///
    /// # Errors
    ///
    /// Returns [`DistributeError`] if the configuration is invalid, a
    /// subset id is unknown, or the strategy cannot be built.
    #[tracing::instrument(skip_all, fields(name = %name.as_ref(), method = %config.method()))]
    pub fn initialize(
        name: impl AsRef<str>,
        config: DistributeConfig,
        stations: &StationSet,
        grid: &RasterGrid,
    ) -> Result<Self, DistributeError> {
        config.validate()?;

        let stations = match config.stations() {
            Some(ids) => stations.select(ids)?,
            None => stations.clone(),
        };

        let strategy = match config.method() {
            Method::Idw => Strategy::Idw {
                idw: Idw::new(
                    &stations,
                    grid,
                    config.idw_power(),
                    vec![true; stations.len()],
                )?,
                detrend: config.detrend(),
            },
            Method::DetrendedKriging => Strategy::DetrendedKriging {
                dk: DetrendedKriging::new(
                    &stations,
                    grid,
                    *config.variogram(),
                    snap_station_mask(&stations, grid, config.grid_mask())?,
                )?,
                constraint: config.constraint(),
            },
            Method::Grid => Strategy::Grid {
                grid: GridInterpolator::new(&stations, grid, &config.grid_params())?,
                detrend: config.detrend(),
            },
            Method::Kriging => Strategy::Kriging(Kriging::new(&stations, grid, *config.variogram())?),
        };

        info!(n_stations = stations.len(), "distribution initialised");
        Ok(Self {
            name: name.as_ref().to_string(),
            config,
            stations,
            strategy,
            output: None,
            variance: None,
        })
    }

    /// Interpolates one step of values aligned with [`Distribution::stations`].
    ///
    /// `NaN` marks a station without data. The result is clamped to the
    /// configured bounds (`NaN` cells stay `NaN`) and stored as the current
    /// output. Kriging also stores its unclamped variance.
    ///
    /// # Errors
    ///
    /// Returns [`DistributeError`] on a length mismatch, when every value is
    /// null, or when the strategy fails. The previous output is kept.
    #[tracing::instrument(skip_all, fields(name = %self.name))]
    pub fn distribute(&mut self, values: &[f64]) -> Result<&Array2<f64>, DistributeError> {
        if values.len() != self.stations.len() {
            return Err(DistributeError::LengthMismatch {
                name: self.name.clone(),
                expected: self.stations.len(),
                got: values.len(),
            });
        }
        if values.iter().all(|v| v.is_nan()) {
            return Err(DistributeError::AllNull {
                name: self.name.clone(),
            });
        }

        let result = self.strategy.calculate(values)?;

        let (min, max) = (self.config.min(), self.config.max());
        let mut clamped = 0usize;
        let mut out = result.values;
        out.mapv_inplace(|v| {
            let c = v.clamp(min, max);
            if c != v && !v.is_nan() {
                clamped += 1;
            }
            c
        });
        debug!(clamped, "step distributed");

        if result.variance.is_some() {
            self.variance = result.variance;
        }
        let out: &Array2<f64> = self.output.insert(out);
        Ok(out)
    }

    /// Reorders a full station row by id and distributes it.
    ///
    /// Stations of this variable that are missing from `ids` get `NaN`;
    /// ids that are not part of this variable are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DistributeError::InvalidConfig`] if `ids` and `values`
    /// differ in length; otherwise see [`Distribution::distribute`].
    pub fn distribute_by_id<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        values: &[f64],
    ) -> Result<&Array2<f64>, DistributeError> {
        if ids.len() != values.len() {
            return Err(DistributeError::InvalidConfig {
                reason: format!("{} ids but {} values", ids.len(), values.len()),
            });
        }
        let by_id: HashMap<&str, f64> = ids
            .iter()
            .map(AsRef::as_ref)
            .zip(values.iter().copied())
            .collect();
        let row: Vec<f64> = self
            .stations
            .ids()
            .iter()
            .map(|id| by_id.get(id.as_str()).copied().unwrap_or(f64::NAN))
            .collect();
        self.distribute(&row)
    }

    /// Returns the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name under which the kriging variance is reported.
    pub fn variance_name(&self) -> String {
        format!("{}_variance", self.name)
    }

    /// Returns the most recent output raster, if any step succeeded.
    pub fn output(&self) -> Option<&Array2<f64>> {
        self.output.as_ref()
    }

    /// Returns the most recent kriging variance raster, if any.
    pub fn variance(&self) -> Option<&Array2<f64>> {
        self.variance.as_ref()
    }

    /// Returns the stations used by this variable, in value order.
    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    /// Returns the distribution method.
    pub fn method(&self) -> Method {
        self.strategy.method()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DistributeConfig {
        &self.config
    }
}
