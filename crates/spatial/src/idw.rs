//! Inverse distance weighting.

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::detrend::GlobalDetrend;
use crate::error::SpatialError;
use crate::raster::{RasterGrid, to_raster};
use crate::stations::StationSet;
use crate::trend::TrendConstraint;

/// Default distance exponent.
pub const DEFAULT_POWER: f64 = 2.0;

/// Inverse distance weighting with weights precomputed for every cell.
#[derive(Debug, Clone)]
pub struct Idw {
    /// `[n_cells × n_stations]` weights `1 / d^power`; infinite where a
    /// cell coincides with a station.
    weights: Array2<f64>,
    power: f64,
    elevations: Vec<f64>,
    dem: Array2<f64>,
    detrend: GlobalDetrend,
}

impl Idw {
    /// Precomputes station-to-cell weights.
    ///
    /// `station_mask` selects the stations used to fit the elevation trend
    /// in [`Idw::calculate_detrended`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if `power` is not finite and positive or the
    /// mask does not match the stations.
    #[tracing::instrument(skip_all, fields(n_stations = stations.len(), n_cells = grid.n_cells(), power = power))]
    pub fn new(
        stations: &StationSet,
        grid: &RasterGrid,
        power: f64,
        station_mask: Vec<bool>,
    ) -> Result<Self, SpatialError> {
        if !power.is_finite() || power <= 0.0 {
            return Err(SpatialError::InvalidConfig {
                reason: format!("idw_power must be finite and > 0, got {power}"),
            });
        }
        if station_mask.len() != stations.len() {
            return Err(SpatialError::LengthMismatch {
                expected: stations.len(),
                got: station_mask.len(),
                field: "station_mask".to_string(),
            });
        }

        let cells = grid.cell_points();
        let points = stations.points();
        let weights = Array2::from_shape_fn((cells.len(), points.len()), |(c, s)| {
            let [cx, cy] = cells[c];
            let [sx, sy] = points[s];
            let d = ((cx - sx).powi(2) + (cy - sy).powi(2)).sqrt();
            if d == 0.0 { f64::INFINITY } else { d.powf(-power) }
        });

        Ok(Self {
            weights,
            power,
            elevations: stations.elevation().to_vec(),
            dem: grid.dem().clone(),
            detrend: GlobalDetrend::new(station_mask),
        })
    }

    /// Returns the distance exponent.
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Weighted mean of the non-null station values at every cell.
    ///
    /// A cell that coincides with a non-null station takes that station's
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] on a length mismatch or when every value
    /// is null.
    pub fn calculate(&self, values: &[f64]) -> Result<Array2<f64>, SpatialError> {
        let n = self.elevations.len();
        if values.len() != n {
            return Err(SpatialError::LengthMismatch {
                expected: n,
                got: values.len(),
                field: "values".to_string(),
            });
        }
        if values.iter().all(|v| v.is_nan()) {
            return Err(SpatialError::AllNull);
        }

        let out: Vec<f64> = self
            .weights
            .outer_iter()
            .map(|row| {
                let mut num = 0.0;
                let mut den = 0.0;
                for (&w, &v) in row.iter().zip(values) {
                    if v.is_nan() {
                        continue;
                    }
                    if w.is_infinite() {
                        return v;
                    }
                    num += w * v;
                    den += w;
                }
                num / den
            })
            .collect();
        to_raster(self.dem.dim(), out)
    }

    /// IDW of the residuals from a global elevation trend, re-trended over
    /// the DEM.
    ///
    /// # Errors
    ///
    /// See [`Idw::calculate`].
    pub fn calculate_detrended(
        &self,
        values: &[f64],
        constraint: TrendConstraint,
    ) -> Result<Array2<f64>, SpatialError> {
        let d = self.detrend.fit(values, &self.elevations, constraint)?;
        debug!(slope = d.trend.slope, intercept = d.trend.intercept, "idw trend");
        let mut out = self.calculate(&d.residuals)?;
        Zip::from(&mut out)
            .and(&self.dem)
            .for_each(|r, &z| *r += d.trend.at(z));
        Ok(out)
    }
}
