//! Interpolation strategy selection.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::SpatialError;
use crate::grid::GridInterpolator;
use crate::idw::Idw;
use crate::kriging::{DetrendedKriging, Kriging};
use crate::trend::TrendConstraint;

/// Distribution method named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// Inverse distance weighting (`"idw"`).
    #[default]
    Idw,
    /// Detrended kriging (`"dk"`).
    DetrendedKriging,
    /// Triangulation-based interpolation (`"grid"`).
    Grid,
    /// Ordinary kriging with variance (`"kriging"`).
    Kriging,
}

impl Method {
    /// Returns the configuration name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Idw => "idw",
            Method::DetrendedKriging => "dk",
            Method::Grid => "grid",
            Method::Kriging => "kriging",
        }
    }
}

impl FromStr for Method {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idw" => Ok(Method::Idw),
            "dk" => Ok(Method::DetrendedKriging),
            "grid" => Ok(Method::Grid),
            "kriging" => Ok(Method::Kriging),
            _ => Err(SpatialError::UnknownMethod {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one interpolation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    /// Interpolated raster.
    pub values: Array2<f64>,
    /// Estimation variance, for strategies that produce one.
    pub variance: Option<Array2<f64>>,
}

impl Interpolation {
    /// Wraps a raster with no variance.
    pub fn from_values(values: Array2<f64>) -> Self {
        Self {
            values,
            variance: None,
        }
    }
}

/// A constructed interpolation strategy.
///
/// `detrend` is `Some(constraint)` when an elevation trend is removed
/// before interpolating and added back afterwards.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Inverse distance weighting.
    Idw {
        /// Precomputed weights.
        idw: Idw,
        /// Elevation detrending, if enabled.
        detrend: Option<TrendConstraint>,
    },
    /// Kriging of residuals from a global elevation trend.
    DetrendedKriging {
        /// Residual kriging system.
        dk: DetrendedKriging,
        /// Trend-sign constraint.
        constraint: TrendConstraint,
    },
    /// Triangulation-based interpolation.
    Grid {
        /// Cached triangulation and detrender.
        grid: GridInterpolator,
        /// Elevation detrending, if enabled.
        detrend: Option<TrendConstraint>,
    },
    /// Ordinary kriging.
    Kriging(Kriging),
}

impl Strategy {
    /// Returns the method this strategy implements.
    pub fn method(&self) -> Method {
        match self {
            Strategy::Idw { .. } => Method::Idw,
            Strategy::DetrendedKriging { .. } => Method::DetrendedKriging,
            Strategy::Grid { .. } => Method::Grid,
            Strategy::Kriging(_) => Method::Kriging,
        }
    }

    /// Interpolates one step of station values (`NaN` = null).
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] on a length mismatch, when every value is
    /// null, or when the strategy fails on this step's data.
    pub fn calculate(&self, values: &[f64]) -> Result<Interpolation, SpatialError> {
        match self {
            Strategy::Idw { idw, detrend } => {
                let out = match detrend {
                    Some(constraint) => idw.calculate_detrended(values, *constraint)?,
                    None => idw.calculate(values)?,
                };
                Ok(Interpolation::from_values(out))
            }
            Strategy::DetrendedKriging { dk, constraint } => {
                Ok(Interpolation::from_values(dk.calculate(values, *constraint)?))
            }
            Strategy::Grid { grid, detrend } => {
                let out = match detrend {
                    Some(constraint) => grid.detrended_interpolation(values, *constraint)?,
                    None => grid.interpolate(values)?,
                };
                Ok(Interpolation::from_values(out))
            }
            Strategy::Kriging(kriging) => kriging.calculate(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("idw".parse::<Method>().unwrap(), Method::Idw);
        assert_eq!("dk".parse::<Method>().unwrap(), Method::DetrendedKriging);
        assert_eq!("Grid".parse::<Method>().unwrap(), Method::Grid);
        assert_eq!("KRIGING".parse::<Method>().unwrap(), Method::Kriging);
    }

    #[test]
    fn test_method_unknown() {
        assert!(matches!(
            "nearest".parse::<Method>(),
            Err(SpatialError::UnknownMethod { ref name }) if name == "nearest"
        ));
    }

    #[test]
    fn test_method_display_round_trips() {
        for m in [Method::Idw, Method::DetrendedKriging, Method::Grid, Method::Kriging] {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
    }
}
