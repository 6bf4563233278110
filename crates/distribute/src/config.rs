//! Per-variable distribution configuration.

use gridcast_spatial::{DEFAULT_POWER, GridParams, Method, Mode, TrendConstraint, VariogramModel};

use crate::error::DistributeError;

/// Default neighbourhood size for local detrending.
pub const DEFAULT_LOCAL_N: usize = 25;

/// How one variable is distributed from stations to the grid.
///
/// Built with the `with_*` methods and checked once by
/// [`DistributeConfig::validate`] when the dispatcher is initialised.
///
/// # Example
///
/// ```
/// use gridcast_distribute::DistributeConfig;
/// use gridcast_spatial::{Method, TrendConstraint};
///
/// let config = DistributeConfig::new(Method::Grid)
///     .with_detrend(TrendConstraint::NegativeOnly)
///     .with_local(10)
///     .with_bounds(-40.0, 50.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistributeConfig {
    /// Interpolation strategy.
    method: Method,
    /// Whether an elevation trend is removed before interpolating.
    detrend: bool,
    /// Allowed sign of the elevation slope.
    constraint: TrendConstraint,
    /// IDW distance exponent.
    idw_power: f64,
    /// Triangulation interpolation mode.
    grid_mode: Mode,
    /// Whether grid detrending is per station.
    grid_local: bool,
    /// Neighbourhood size for local detrending.
    grid_local_n: usize,
    /// Whether the grid mask restricts global detrending.
    grid_mask: bool,
    /// Kriging semivariogram.
    variogram: VariogramModel,
    /// Lower clamp bound.
    min: f64,
    /// Upper clamp bound.
    max: f64,
    /// Station subset (`None` = every station).
    stations: Option<Vec<String>>,
}

impl DistributeConfig {
    /// Creates a configuration for `method` with no detrending and no bounds.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            detrend: false,
            constraint: TrendConstraint::Unconstrained,
            idw_power: DEFAULT_POWER,
            grid_mode: Mode::Linear,
            grid_local: false,
            grid_local_n: DEFAULT_LOCAL_N,
            grid_mask: false,
            variogram: VariogramModel::default(),
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            stations: None,
        }
    }

    /// Enables elevation detrending with the given slope constraint.
    pub fn with_detrend(mut self, constraint: TrendConstraint) -> Self {
        self.detrend = true;
        self.constraint = constraint;
        self
    }

    /// Sets the slope constraint without enabling detrending.
    ///
    /// Detrended kriging always removes a trend and reads this directly.
    pub fn with_constraint(mut self, constraint: TrendConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Sets the IDW distance exponent.
    pub fn with_idw_power(mut self, power: f64) -> Self {
        self.idw_power = power;
        self
    }

    /// Sets the triangulation interpolation mode.
    pub fn with_grid_mode(mut self, mode: Mode) -> Self {
        self.grid_mode = mode;
        self
    }

    /// Enables local detrending with neighbourhoods of `k` stations.
    pub fn with_local(mut self, k: usize) -> Self {
        self.grid_local = true;
        self.grid_local_n = k;
        self
    }

    /// Sets whether the grid mask restricts global detrending.
    pub fn with_grid_mask(mut self, use_mask: bool) -> Self {
        self.grid_mask = use_mask;
        self
    }

    /// Sets the kriging semivariogram.
    pub fn with_variogram(mut self, model: VariogramModel) -> Self {
        self.variogram = model;
        self
    }

    /// Sets the clamp bounds.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Restricts the variable to the named stations.
    pub fn with_stations(mut self, ids: Vec<String>) -> Self {
        self.stations = Some(ids);
        self
    }

    // --- Accessors ---

    /// Returns the interpolation strategy.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the slope constraint if detrending is enabled.
    pub fn detrend(&self) -> Option<TrendConstraint> {
        self.detrend.then_some(self.constraint)
    }

    /// Returns the slope constraint, whether or not detrending is enabled.
    pub fn constraint(&self) -> TrendConstraint {
        self.constraint
    }

    /// Returns the IDW distance exponent.
    pub fn idw_power(&self) -> f64 {
        self.idw_power
    }

    /// Returns the grid interpolator parameters.
    pub fn grid_params(&self) -> GridParams {
        let params = GridParams::new()
            .with_mode(self.grid_mode)
            .with_mask(self.grid_mask);
        if self.grid_local {
            params.with_local(self.grid_local_n)
        } else {
            params
        }
    }

    /// Returns whether the grid mask restricts global detrending.
    pub fn grid_mask(&self) -> bool {
        self.grid_mask
    }

    /// Returns the kriging semivariogram.
    pub fn variogram(&self) -> &VariogramModel {
        &self.variogram
    }

    /// Returns the lower clamp bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns the upper clamp bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns the station subset, if any.
    pub fn stations(&self) -> Option<&[String]> {
        self.stations.as_deref()
    }

    /// Validates the configuration.
    ///
    /// Checks that the bounds are ordered, the IDW power is finite and
    /// positive, the local neighbourhood holds at least one station, the
    /// variogram parameters are valid and any station subset is non-empty.
    pub fn validate(&self) -> Result<(), DistributeError> {
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(DistributeError::InvalidConfig {
                reason: format!("min ({}) must be <= max ({})", self.min, self.max),
            });
        }
        if !self.idw_power.is_finite() || self.idw_power <= 0.0 {
            return Err(DistributeError::InvalidConfig {
                reason: format!("idw_power must be finite and > 0, got {}", self.idw_power),
            });
        }
        self.grid_params().validate()?;
        self.variogram.validate()?;
        if self.stations.as_ref().is_some_and(|s| s.is_empty()) {
            return Err(DistributeError::InvalidConfig {
                reason: "stations subset is empty".to_string(),
            });
        }
        Ok(())
    }
}
