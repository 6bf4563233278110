//! Global and per-station elevation detrending.

use gridcast_knn::{KnnConfig, NeighborIndex, Neighborhoods};
use tracing::debug;

use crate::error::SpatialError;
use crate::raster::RasterGrid;
use crate::stations::StationSet;
use crate::trend::{Trend, TrendConstraint, fit_trend};

/// Index of the axis entry closest to `v` (first on ties).
fn argmin_abs(axis: impl Iterator<Item = f64>, v: f64) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, a) in axis.enumerate() {
        let d = (a - v).abs();
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Flags the stations that take part in global detrending.
///
/// Each station is snapped to the nearest raster column (by the x
/// coordinates of the first row) and row (by the y coordinates of the
/// first column) and takes the mask value of that cell. When `use_mask`
/// is false every station is included.
///
/// # Errors
///
/// Returns [`SpatialError::MissingMask`] if `use_mask` is set and the grid
/// has no mask.
pub fn snap_station_mask(
    stations: &StationSet,
    grid: &RasterGrid,
    use_mask: bool,
) -> Result<Vec<bool>, SpatialError> {
    if !use_mask {
        return Ok(vec![true; stations.len()]);
    }
    let mask = grid.mask().ok_or(SpatialError::MissingMask)?;
    let x_axis = grid.x_axis();
    let y_axis = grid.y_axis();
    let flags = stations
        .x()
        .iter()
        .zip(stations.y())
        .map(|(&sx, &sy)| {
            let col = argmin_abs(x_axis.iter().copied(), sx);
            let row = argmin_abs(y_axis.iter().copied(), sy);
            mask[[row, col]]
        })
        .collect();
    Ok(flags)
}

/// Result of removing one elevation trend from station values.
#[derive(Debug, Clone, PartialEq)]
pub struct DetrendedValues {
    /// The fitted trend.
    pub trend: Trend,
    /// `value - trend(elevation)` per station; NaN for null stations.
    pub residuals: Vec<f64>,
}

/// Single elevation trend fitted over the masked stations.
#[derive(Debug, Clone)]
pub struct GlobalDetrend {
    station_mask: Vec<bool>,
}

impl GlobalDetrend {
    /// Creates a detrender restricted to stations flagged in `station_mask`.
    pub fn new(station_mask: Vec<bool>) -> Self {
        Self { station_mask }
    }

    /// Returns the per-station inclusion flags.
    pub fn station_mask(&self) -> &[bool] {
        &self.station_mask
    }

    /// Fits the trend and computes residuals for every non-null station.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::LengthMismatch`] if `values` or `elevations`
    /// do not match the station mask.
    pub fn fit(
        &self,
        values: &[f64],
        elevations: &[f64],
        constraint: TrendConstraint,
    ) -> Result<DetrendedValues, SpatialError> {
        let n = self.station_mask.len();
        for (field, len) in [("values", values.len()), ("elevations", elevations.len())] {
            if len != n {
                return Err(SpatialError::LengthMismatch {
                    expected: n,
                    got: len,
                    field: field.to_string(),
                });
            }
        }

        let (z, v): (Vec<f64>, Vec<f64>) = elevations
            .iter()
            .zip(values)
            .zip(&self.station_mask)
            .filter(|(_, keep)| **keep)
            .map(|((&z, &v), _)| (z, v))
            .unzip();
        let trend = fit_trend(&z, &v, constraint);

        let residuals = values
            .iter()
            .zip(elevations)
            .map(|(&v, &z)| v - trend.at(z))
            .collect();
        Ok(DetrendedValues { trend, residuals })
    }
}

/// Per-station trends and residuals from local detrending.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTrends {
    /// Trend fitted over each station's neighbourhood; FLAT for null stations.
    pub trends: Vec<Trend>,
    /// `value - trend(elevation)` per station; NaN for null stations.
    pub residuals: Vec<f64>,
}

impl LocalTrends {
    /// Returns the slope of every station's trend.
    pub fn slopes(&self) -> Vec<f64> {
        self.trends.iter().map(|t| t.slope).collect()
    }

    /// Returns the intercept of every station's trend.
    pub fn intercepts(&self) -> Vec<f64> {
        self.trends.iter().map(|t| t.intercept).collect()
    }
}

/// Elevation trends fitted separately over each station's nearest neighbours.
#[derive(Debug, Clone)]
pub struct LocalDetrend {
    index: NeighborIndex,
    config: KnnConfig,
    /// Neighbourhoods over all stations, used on steps without nulls.
    neighborhoods: Neighborhoods,
}

impl LocalDetrend {
    /// Creates a local detrender with neighbourhoods of `k` stations.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Knn`] if `k` is zero.
    pub fn new(index: NeighborIndex, k: usize) -> Result<Self, SpatialError> {
        let config = KnnConfig::new(k);
        let neighborhoods = index.neighborhoods(&config)?;
        Ok(Self {
            index,
            config,
            neighborhoods,
        })
    }

    /// Returns the neighbourhood size, the station itself included.
    pub fn k(&self) -> usize {
        self.config.k()
    }

    /// Returns the neighbour index.
    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    /// Fits one trend per non-null station.
    ///
    /// A station's neighbourhood is itself plus its `k - 1` nearest other
    /// stations that have a value this step. The station is its own
    /// nearest neighbour, as in a k-d tree query at a station location,
    /// so `k = 3` fits each trend through the station and two others.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::LengthMismatch`] if `values` or `elevations`
    /// do not match the index.
    pub fn fit(
        &self,
        values: &[f64],
        elevations: &[f64],
        constraint: TrendConstraint,
    ) -> Result<LocalTrends, SpatialError> {
        let n = self.index.len();
        for (field, len) in [("values", values.len()), ("elevations", elevations.len())] {
            if len != n {
                return Err(SpatialError::LengthMismatch {
                    expected: n,
                    got: len,
                    field: field.to_string(),
                });
            }
        }

        let complete = !values.iter().any(|v| v.is_nan());
        let mut trends = Vec::with_capacity(n);
        let mut residuals = Vec::with_capacity(n);
        let mut hood = Vec::with_capacity(self.k());
        let mut z = Vec::with_capacity(self.k());
        let mut v = Vec::with_capacity(self.k());
        for i in 0..n {
            if values[i].is_nan() {
                trends.push(Trend::FLAT);
                residuals.push(f64::NAN);
                continue;
            }
            hood.clear();
            if complete {
                hood.extend_from_slice(self.neighborhoods.get(i));
            } else {
                let [x, y] = self.index.point(i);
                hood.push(i);
                hood.extend(
                    self.index
                        .k_nearest_where(x, y, self.k() - 1, |j| j != i && !values[j].is_nan()),
                );
            }

            z.clear();
            v.clear();
            for &j in &hood {
                z.push(elevations[j]);
                v.push(values[j]);
            }
            let trend = fit_trend(&z, &v, constraint);
            trends.push(trend);
            residuals.push(values[i] - trend.at(elevations[i]));
        }

        debug!(n_stations = n, k = self.k(), complete, "local trends fitted");
        Ok(LocalTrends { trends, residuals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn stations() -> StationSet {
        StationSet::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![0.0, 1000.0, 2000.0, 3000.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![100.0, 500.0, 900.0, 1300.0],
        )
        .unwrap()
    }

    #[test]
    fn test_snap_disabled_includes_all() {
        let grid =
            RasterGrid::from_axes(&[0.0, 1500.0, 3000.0], &[0.0], Array2::zeros((1, 3))).unwrap();
        assert_eq!(snap_station_mask(&stations(), &grid, false).unwrap(), vec![true; 4]);
    }

    #[test]
    fn test_snap_requires_mask_when_enabled() {
        let grid =
            RasterGrid::from_axes(&[0.0, 1500.0, 3000.0], &[0.0], Array2::zeros((1, 3))).unwrap();
        assert!(matches!(
            snap_station_mask(&stations(), &grid, true),
            Err(SpatialError::MissingMask)
        ));
    }

    #[test]
    fn test_snap_uses_nearest_cell() {
        let mask = Array2::from_shape_vec((1, 3), vec![true, false, true]).unwrap();
        let grid = RasterGrid::from_axes(&[0.0, 1500.0, 3000.0], &[0.0], Array2::zeros((1, 3)))
            .unwrap()
            .with_mask(mask)
            .unwrap();
        // Station b at 1000 snaps to column 1; c at 2000 snaps to column 1 too.
        assert_eq!(
            snap_station_mask(&stations(), &grid, true).unwrap(),
            vec![true, false, false, true]
        );
        assert_eq!(snap_station_mask(&stations(), &grid, false).unwrap(), vec![true; 4]);
    }

    #[test]
    fn test_global_fit_zero_residuals_on_line() {
        let s = stations();
        let values: Vec<f64> = s.elevation().iter().map(|z| 11.0 - 0.01 * z).collect();
        let d = GlobalDetrend::new(vec![true; 4])
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        assert_abs_diff_eq!(d.trend.slope, -0.01, epsilon = 1e-12);
        for r in d.residuals {
            assert_abs_diff_eq!(r, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_global_fit_respects_mask_and_nulls() {
        let s = stations();
        // Station d is off the line but masked out; station b is null.
        let values = [10.0, f64::NAN, 2.0, 50.0];
        let d = GlobalDetrend::new(vec![true, true, true, false])
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        assert_abs_diff_eq!(d.trend.slope, -0.01, epsilon = 1e-12);
        assert!(d.residuals[1].is_nan());
        assert_abs_diff_eq!(d.residuals[3], 50.0 - (11.0 - 13.0), epsilon = 1e-9);
    }

    #[test]
    fn test_global_fit_length_mismatch() {
        let err = GlobalDetrend::new(vec![true; 4])
            .fit(&[1.0, 2.0], &[0.0; 4], TrendConstraint::Unconstrained)
            .unwrap_err();
        assert!(matches!(err, SpatialError::LengthMismatch { expected: 4, got: 2, .. }));
    }

    #[test]
    fn test_local_with_full_neighbourhood_matches_global() {
        let s = stations();
        let values = [9.0, 6.5, 1.0, -1.5];
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 4)
            .unwrap()
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        let global = GlobalDetrend::new(vec![true; 4])
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        for t in &local.trends {
            assert_abs_diff_eq!(t.slope, global.trend.slope, epsilon = 1e-12);
            assert_abs_diff_eq!(t.intercept, global.trend.intercept, epsilon = 1e-9);
        }
        for (a, b) in local.residuals.iter().zip(&global.residuals) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_local_pairs_use_nearest_neighbour() {
        let s = stations();
        let values = [1.0, 5.0, 5.0, 1.0];
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 2)
            .unwrap()
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        // a pairs with b (rising), d pairs with c (falling).
        assert_abs_diff_eq!(local.trends[0].slope, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(local.trends[3].slope, -0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(local.residuals[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_local_skips_null_neighbours() {
        let s = stations();
        let values = [1.0, f64::NAN, 9.0, 13.0];
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 2)
            .unwrap()
            .fit(&values, s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        assert_eq!(local.trends[1], Trend::FLAT);
        assert!(local.residuals[1].is_nan());
        // a now pairs with c: (100, 1) and (900, 9).
        assert_abs_diff_eq!(local.trends[0].slope, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_local_null_path_matches_precomputed() {
        let s = stations();
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 2).unwrap();
        let complete = local
            .fit(&[1.0, 5.0, 7.0, 4.0], s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        let partial = local
            .fit(&[1.0, 5.0, 7.0, f64::NAN], s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        // a and b never reach d; c is equidistant from b and d.
        for i in 0..2 {
            assert_eq!(complete.trends[i], partial.trends[i]);
        }
    }

    #[test]
    fn test_local_k_one_is_flat() {
        let s = stations();
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 1)
            .unwrap()
            .fit(&[1.0, 2.0, 3.0, 4.0], s.elevation(), TrendConstraint::Unconstrained)
            .unwrap();
        assert!(local.trends.iter().all(|t| *t == Trend::FLAT));
        assert_eq!(local.residuals, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_local_zero_k_rejected() {
        let s = stations();
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        assert!(matches!(
            LocalDetrend::new(index, 0),
            Err(SpatialError::Knn(_))
        ));
    }

    #[test]
    fn test_local_constraint_per_station() {
        let s = stations();
        let values = [1.0, 5.0, 5.0, 1.0];
        let index = NeighborIndex::new(s.x(), s.y()).unwrap();
        let local = LocalDetrend::new(index, 2)
            .unwrap()
            .fit(&values, s.elevation(), TrendConstraint::PositiveOnly)
            .unwrap();
        assert!(local.trends[0].slope > 0.0);
        assert_eq!(local.trends[3], Trend::FLAT);
        assert_abs_diff_eq!(local.residuals[3], 1.0, epsilon = 1e-12);
    }
}
