//! Ordinary kriging and detrended kriging.
//!
//! The kriging system
//!
//! ```text
//! | γ(d11) … γ(d1n) 1 | | w1 |   | γ(d10) |
//! |   ⋮        ⋮    ⋮ | | ⋮  | = |   ⋮    |
//! | γ(dn1) … γ(dnn) 1 | | wn |   | γ(dn0) |
//! |   1    …   1    0 | | μ  |   |   1    |
//! ```
//!
//! depends only on station and cell geometry, so it is factorised once and
//! the weights and kriging variance `Σ wᵢ γ(dᵢ0) + μ` of every cell are
//! stored. Each step is then a matrix-vector product.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, Zip};
use tracing::debug;

use crate::detrend::GlobalDetrend;
use crate::error::SpatialError;
use crate::raster::{RasterGrid, to_raster};
use crate::stations::StationSet;
use crate::strategy::Interpolation;
use crate::trend::TrendConstraint;

/// Lags below this are treated as zero distance.
const ZERO_LAG: f64 = 1e-10;

/// Semivariogram model.
///
/// `sill` is the partial sill (excluding the nugget); `range` is the
/// practical range at which the exponential and gaussian models reach 95%
/// of the sill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariogramModel {
    /// γ(h) = nugget + slope·h
    Linear {
        /// Discontinuity at the origin.
        nugget: f64,
        /// Increase per unit distance.
        slope: f64,
    },
    /// γ(h) = nugget + sill·(1.5·h/a − 0.5·(h/a)³) for h < a, nugget + sill beyond.
    Spherical {
        /// Discontinuity at the origin.
        nugget: f64,
        /// Partial sill.
        sill: f64,
        /// Range a.
        range: f64,
    },
    /// γ(h) = nugget + sill·(1 − exp(−3h/a))
    Exponential {
        /// Discontinuity at the origin.
        nugget: f64,
        /// Partial sill.
        sill: f64,
        /// Practical range a.
        range: f64,
    },
    /// γ(h) = nugget + sill·(1 − exp(−3(h/a)²))
    Gaussian {
        /// Discontinuity at the origin.
        nugget: f64,
        /// Partial sill.
        sill: f64,
        /// Practical range a.
        range: f64,
    },
}

/// Name of a [`VariogramModel`] family, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariogramKind {
    /// Linear model.
    Linear,
    /// Spherical model.
    Spherical,
    /// Exponential model.
    Exponential,
    /// Gaussian model.
    Gaussian,
}

impl FromStr for VariogramKind {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(VariogramKind::Linear),
            "spherical" => Ok(VariogramKind::Spherical),
            "exponential" => Ok(VariogramKind::Exponential),
            "gaussian" => Ok(VariogramKind::Gaussian),
            _ => Err(SpatialError::UnknownVariogram {
                name: s.to_string(),
            }),
        }
    }
}

impl VariogramModel {
    /// Builds a model of the given family; `slope` is used by the linear
    /// model only, `sill` and `range` by the others.
    pub fn from_kind(kind: VariogramKind, nugget: f64, sill: f64, range: f64, slope: f64) -> Self {
        match kind {
            VariogramKind::Linear => VariogramModel::Linear { nugget, slope },
            VariogramKind::Spherical => VariogramModel::Spherical {
                nugget,
                sill,
                range,
            },
            VariogramKind::Exponential => VariogramModel::Exponential {
                nugget,
                sill,
                range,
            },
            VariogramKind::Gaussian => VariogramModel::Gaussian {
                nugget,
                sill,
                range,
            },
        }
    }

    /// Returns the model family.
    pub fn kind(&self) -> VariogramKind {
        match self {
            VariogramModel::Linear { .. } => VariogramKind::Linear,
            VariogramModel::Spherical { .. } => VariogramKind::Spherical,
            VariogramModel::Exponential { .. } => VariogramKind::Exponential,
            VariogramModel::Gaussian { .. } => VariogramKind::Gaussian,
        }
    }

    /// Semivariance at lag `h`. Zero at zero lag for every model.
    pub fn gamma(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }
        match *self {
            VariogramModel::Linear { nugget, slope } => nugget + slope * h,
            VariogramModel::Spherical {
                nugget,
                sill,
                range,
            } => {
                if h >= range {
                    nugget + sill
                } else {
                    let r = h / range;
                    nugget + sill * (1.5 * r - 0.5 * r.powi(3))
                }
            }
            VariogramModel::Exponential {
                nugget,
                sill,
                range,
            } => nugget + sill * (1.0 - (-3.0 * h / range).exp()),
            VariogramModel::Gaussian {
                nugget,
                sill,
                range,
            } => nugget + sill * (1.0 - (-3.0 * (h / range).powi(2)).exp()),
        }
    }

    /// Validates the parameters.
    ///
    /// Nugget, sill and slope must be finite and non-negative; range must be
    /// finite and positive.
    pub fn validate(&self) -> Result<(), SpatialError> {
        let non_negative = |name: &str, v: f64| {
            if !v.is_finite() || v < 0.0 {
                return Err(SpatialError::InvalidConfig {
                    reason: format!("krig_{name} must be finite and >= 0, got {v}"),
                });
            }
            Ok(())
        };
        match *self {
            VariogramModel::Linear { nugget, slope } => {
                non_negative("nugget", nugget)?;
                non_negative("slope", slope)
            }
            VariogramModel::Spherical {
                nugget,
                sill,
                range,
            }
            | VariogramModel::Exponential {
                nugget,
                sill,
                range,
            }
            | VariogramModel::Gaussian {
                nugget,
                sill,
                range,
            } => {
                non_negative("nugget", nugget)?;
                non_negative("sill", sill)?;
                if !range.is_finite() || range <= 0.0 {
                    return Err(SpatialError::InvalidConfig {
                        reason: format!("krig_range must be finite and > 0, got {range}"),
                    });
                }
                Ok(())
            }
        }
    }
}

impl Default for VariogramModel {
    fn default() -> Self {
        VariogramModel::Linear {
            nugget: 0.0,
            slope: 1.0,
        }
    }
}

impl fmt::Display for VariogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariogramKind::Linear => "linear",
            VariogramKind::Spherical => "spherical",
            VariogramKind::Exponential => "exponential",
            VariogramKind::Gaussian => "gaussian",
        };
        f.write_str(name)
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Solved kriging system for a fixed set of stations and cells.
#[derive(Debug, Clone)]
struct KrigingSystem {
    /// `[n_cells × n_stations]` kriging weights.
    weights: Array2<f64>,
    /// Kriging variance per cell.
    variance: Vec<f64>,
}

impl KrigingSystem {
    fn solve(
        points: &[[f64; 2]],
        cells: &[[f64; 2]],
        model: &VariogramModel,
    ) -> Result<Self, SpatialError> {
        let n = points.len();
        let singular = move || SpatialError::SingularSystem { n_stations: n };

        let a = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i < n, j < n) {
            (true, true) => model.gamma(distance(points[i], points[j])),
            (false, false) => 0.0,
            _ => 1.0,
        });
        let lu = a.lu();
        if !lu.is_invertible() {
            return Err(singular());
        }

        let mut weights = Array2::zeros((cells.len(), n));
        let mut variance = Vec::with_capacity(cells.len());
        for (c, &cell) in cells.iter().enumerate() {
            let b = DVector::from_fn(n + 1, |i, _| {
                if i < n {
                    model.gamma(distance(points[i], cell))
                } else {
                    1.0
                }
            });
            let x = lu.solve(&b).ok_or_else(singular)?;
            if x.iter().any(|v| !v.is_finite()) {
                return Err(singular());
            }
            for s in 0..n {
                weights[[c, s]] = x[s];
            }
            variance.push(b.dot(&x).max(0.0));
        }
        Ok(Self { weights, variance })
    }

    fn estimate(&self, values: &[f64]) -> Vec<f64> {
        self.weights.dot(&Array1::from(values.to_vec())).to_vec()
    }
}

/// Ordinary kriging onto a raster.
#[derive(Debug, Clone)]
pub struct Kriging {
    points: Vec<[f64; 2]>,
    cells: Vec<[f64; 2]>,
    shape: (usize, usize),
    model: VariogramModel,
    system: KrigingSystem,
}

impl Kriging {
    /// Factorises the kriging system and solves it for every cell.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the variogram is invalid or the system
    /// is singular (for example two stations at the same location).
    #[tracing::instrument(skip_all, fields(n_stations = stations.len(), n_cells = grid.n_cells(), model = %model.kind()))]
    pub fn new(
        stations: &StationSet,
        grid: &RasterGrid,
        model: VariogramModel,
    ) -> Result<Self, SpatialError> {
        model.validate()?;
        let points = stations.points();
        let cells = grid.cell_points();
        let system = KrigingSystem::solve(&points, &cells, &model)?;
        Ok(Self {
            points,
            cells,
            shape: grid.shape(),
            model,
            system,
        })
    }

    /// Returns the variogram model.
    pub fn model(&self) -> &VariogramModel {
        &self.model
    }

    /// Kriging estimate and variance at every cell.
    ///
    /// When some values are null a transient system over the remaining
    /// stations is solved; the cached one is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] on a length mismatch, when every value is
    /// null, or when the transient system is singular.
    pub fn calculate(&self, values: &[f64]) -> Result<Interpolation, SpatialError> {
        let n = self.points.len();
        if values.len() != n {
            return Err(SpatialError::LengthMismatch {
                expected: n,
                got: values.len(),
                field: "values".to_string(),
            });
        }
        let present: Vec<usize> = (0..n).filter(|&i| !values[i].is_nan()).collect();
        if present.is_empty() {
            return Err(SpatialError::AllNull);
        }

        let (estimate, variance) = if present.len() == n {
            (self.system.estimate(values), self.system.variance.clone())
        } else {
            debug!(n_present = present.len(), n_stations = n, "solving transient kriging system");
            let points: Vec<[f64; 2]> = present.iter().map(|&i| self.points[i]).collect();
            let subset: Vec<f64> = present.iter().map(|&i| values[i]).collect();
            let system = KrigingSystem::solve(&points, &self.cells, &self.model)?;
            (system.estimate(&subset), system.variance)
        };

        Ok(Interpolation {
            values: to_raster(self.shape, estimate)?,
            variance: Some(to_raster(self.shape, variance)?),
        })
    }
}

/// Ordinary kriging of residuals from a global elevation trend.
#[derive(Debug, Clone)]
pub struct DetrendedKriging {
    kriging: Kriging,
    detrend: GlobalDetrend,
    elevations: Vec<f64>,
    dem: Array2<f64>,
}

impl DetrendedKriging {
    /// Builds the residual kriging system.
    ///
    /// `station_mask` selects the stations used to fit the trend.
    ///
    /// # Errors
    ///
    /// See [`Kriging::new`]; also fails if the mask does not match the
    /// stations.
    pub fn new(
        stations: &StationSet,
        grid: &RasterGrid,
        model: VariogramModel,
        station_mask: Vec<bool>,
    ) -> Result<Self, SpatialError> {
        if station_mask.len() != stations.len() {
            return Err(SpatialError::LengthMismatch {
                expected: stations.len(),
                got: station_mask.len(),
                field: "station_mask".to_string(),
            });
        }
        Ok(Self {
            kriging: Kriging::new(stations, grid, model)?,
            detrend: GlobalDetrend::new(station_mask),
            elevations: stations.elevation().to_vec(),
            dem: grid.dem().clone(),
        })
    }

    /// Returns the underlying residual kriging.
    pub fn kriging(&self) -> &Kriging {
        &self.kriging
    }

    /// Detrends, krigs the residuals and adds the trend back over the DEM.
    ///
    /// # Errors
    ///
    /// See [`Kriging::calculate`].
    pub fn calculate(
        &self,
        values: &[f64],
        constraint: TrendConstraint,
    ) -> Result<Array2<f64>, SpatialError> {
        let d = self.detrend.fit(values, &self.elevations, constraint)?;
        debug!(slope = d.trend.slope, intercept = d.trend.intercept, "dk trend");
        let mut out = self.kriging.calculate(&d.residuals)?.values;
        Zip::from(&mut out)
            .and(&self.dem)
            .for_each(|r, &z| *r += d.trend.at(z));
        Ok(out)
    }
}
