//! Linear elevation trends.

use gridcast_stats::linear_fit;
use tracing::debug;

use crate::error::SpatialError;

/// Linear relation `value = slope * elevation + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    /// Change in value per metre of elevation.
    pub slope: f64,
    /// Value at zero elevation.
    pub intercept: f64,
}

impl Trend {
    /// The trend that removes nothing.
    pub const FLAT: Trend = Trend {
        slope: 0.0,
        intercept: 0.0,
    };

    /// Returns the trend value at elevation `z`.
    pub fn at(&self, z: f64) -> f64 {
        self.slope * z + self.intercept
    }
}

/// Allowed sign of the elevation slope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrendConstraint {
    /// Only slopes `<= 0` are kept.
    NegativeOnly,
    /// Any slope is kept.
    #[default]
    Unconstrained,
    /// Only slopes `>= 0` are kept.
    PositiveOnly,
}

impl TrendConstraint {
    /// Returns the integer configuration value (`-1`, `0` or `1`).
    pub fn as_int(&self) -> i64 {
        match self {
            TrendConstraint::NegativeOnly => -1,
            TrendConstraint::Unconstrained => 0,
            TrendConstraint::PositiveOnly => 1,
        }
    }

    /// Replaces a trend whose slope has the forbidden sign with [`Trend::FLAT`].
    pub fn apply(&self, trend: Trend) -> Trend {
        match self {
            TrendConstraint::PositiveOnly if trend.slope < 0.0 => Trend::FLAT,
            TrendConstraint::NegativeOnly if trend.slope > 0.0 => Trend::FLAT,
            _ => trend,
        }
    }
}

impl TryFrom<i64> for TrendConstraint {
    type Error = SpatialError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(TrendConstraint::NegativeOnly),
            0 => Ok(TrendConstraint::Unconstrained),
            1 => Ok(TrendConstraint::PositiveOnly),
            _ => Err(SpatialError::InvalidConstraint { value }),
        }
    }
}

/// Fits a least-squares elevation trend and applies `constraint`.
///
/// Only pairs where both elevation and value are finite take part. With
/// fewer than two such pairs, or no spread in elevation, the fit is
/// [`Trend::FLAT`].
pub fn fit_trend(elevations: &[f64], values: &[f64], constraint: TrendConstraint) -> Trend {
    let trend = match linear_fit(elevations, values) {
        Some(fit) => Trend {
            slope: fit.slope,
            intercept: fit.intercept,
        },
        None => {
            debug!(n = values.len(), "degenerate elevation regression, using flat trend");
            Trend::FLAT
        }
    };
    constraint.apply(trend)
}
