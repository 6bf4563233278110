//! Triangulation-based interpolation with optional elevation detrending.

use gridcast_knn::NeighborIndex;
use gridcast_triangulation::{Mode, QueryPlan, Triangulation};
use ndarray::{Array2, Zip};
use tracing::debug;

use crate::detrend::{GlobalDetrend, LocalDetrend, snap_station_mask};
use crate::error::SpatialError;
use crate::raster::{RasterGrid, to_raster};
use crate::stations::StationSet;
use crate::trend::TrendConstraint;

/// Parameters of the grid interpolator.
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Scattered interpolation mode.
    mode: Mode,
    /// Neighbourhood size for local detrending (`None` = global).
    local: Option<usize>,
    /// Whether the grid mask restricts global detrending.
    use_mask: bool,
}

impl GridParams {
    /// Creates parameters for linear interpolation with global detrending.
    pub fn new() -> Self {
        Self {
            mode: Mode::Linear,
            local: None,
            use_mask: false,
        }
    }

    /// Sets the interpolation mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables local detrending with neighbourhoods of `k` stations.
    pub fn with_local(mut self, k: usize) -> Self {
        self.local = Some(k);
        self
    }

    /// Sets whether the grid mask restricts global detrending.
    pub fn with_mask(mut self, use_mask: bool) -> Self {
        self.use_mask = use_mask;
        self
    }

    /// Returns the interpolation mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the local neighbourhood size, if local detrending is enabled.
    pub fn local(&self) -> Option<usize> {
        self.local
    }

    /// Returns whether the grid mask is used.
    pub fn use_mask(&self) -> bool {
        self.use_mask
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if self.local == Some(0) {
            return Err(SpatialError::InvalidConfig {
                reason: "grid_local_n must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GridParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Elevation detrending strategy of a [`GridInterpolator`].
#[derive(Debug, Clone)]
enum Detrender {
    Global(GlobalDetrend),
    Local(LocalDetrend),
}

/// Interpolates station values onto a raster through a cached triangulation.
#[derive(Debug, Clone)]
pub struct GridInterpolator {
    points: Vec<[f64; 2]>,
    elevations: Vec<f64>,
    cells: Vec<[f64; 2]>,
    dem: Array2<f64>,
    triangulation: Triangulation,
    plan: QueryPlan,
    mode: Mode,
    detrender: Detrender,
}

impl GridInterpolator {
    /// Triangulates the stations and locates every raster cell.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the parameters are invalid or the
    /// stations cannot be triangulated.
    #[tracing::instrument(skip_all, fields(n_stations = stations.len(), n_cells = grid.n_cells()))]
    pub fn new(
        stations: &StationSet,
        grid: &RasterGrid,
        params: &GridParams,
    ) -> Result<Self, SpatialError> {
        params.validate()?;
        let points = stations.points();
        let cells = grid.cell_points();
        let triangulation = Triangulation::new(&points)?;
        let plan = triangulation.plan(&cells);

        let detrender = match params.local() {
            Some(k) => {
                let index = NeighborIndex::new(stations.x(), stations.y())?;
                Detrender::Local(LocalDetrend::new(index, k)?)
            }
            None => Detrender::Global(GlobalDetrend::new(snap_station_mask(
                stations,
                grid,
                params.use_mask(),
            )?)),
        };

        debug!(n_outside = plan.n_outside(), "grid cells located");
        Ok(Self {
            points,
            elevations: stations.elevation().to_vec(),
            cells,
            dem: grid.dem().clone(),
            triangulation,
            plan,
            mode: params.mode(),
            detrender,
        })
    }

    /// Returns the interpolation mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the cached station triangulation.
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Returns `true` when trends are fitted per station.
    pub fn is_local(&self) -> bool {
        matches!(self.detrender, Detrender::Local(_))
    }

    /// Interpolates station values without detrending.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] on a length mismatch, when every value is
    /// null, or when the non-null stations cannot be triangulated.
    pub fn interpolate(&self, values: &[f64]) -> Result<Array2<f64>, SpatialError> {
        self.check_len(values)?;
        let mut fields = self.interpolate_fields(&[values], values)?;
        let field = fields.pop().unwrap_or_default();
        to_raster(self.dem.dim(), field)
    }

    /// Interpolates station values with elevation detrending.
    ///
    /// Global mode fits one trend, interpolates the residuals and adds the
    /// trend back over the DEM. Local mode fits one trend per station and
    /// interpolates slope, intercept and residual fields separately.
    ///
    /// # Errors
    ///
    /// See [`GridInterpolator::interpolate`].
    #[tracing::instrument(skip_all, fields(local = self.is_local()))]
    pub fn detrended_interpolation(
        &self,
        values: &[f64],
        constraint: TrendConstraint,
    ) -> Result<Array2<f64>, SpatialError> {
        self.check_len(values)?;
        let shape = self.dem.dim();

        match &self.detrender {
            Detrender::Global(detrend) => {
                let d = detrend.fit(values, &self.elevations, constraint)?;
                debug!(slope = d.trend.slope, intercept = d.trend.intercept, "global trend");
                let mut fields = self.interpolate_fields(&[&d.residuals], values)?;
                let mut out = to_raster(shape, fields.pop().unwrap_or_default())?;
                Zip::from(&mut out)
                    .and(&self.dem)
                    .for_each(|r, &z| *r += d.trend.at(z));
                Ok(out)
            }
            Detrender::Local(detrend) => {
                let local = detrend.fit(values, &self.elevations, constraint)?;
                let slopes = local.slopes();
                let intercepts = local.intercepts();
                let mut fields =
                    self.interpolate_fields(&[&local.residuals, &slopes, &intercepts], values)?;
                let intercept = to_raster(shape, fields.pop().unwrap_or_default())?;
                let slope = to_raster(shape, fields.pop().unwrap_or_default())?;
                let mut out = to_raster(shape, fields.pop().unwrap_or_default())?;
                Zip::from(&mut out)
                    .and(&slope)
                    .and(&intercept)
                    .and(&self.dem)
                    .for_each(|r, &m, &b, &z| *r += m * z + b);
                Ok(out)
            }
        }
    }

    fn check_len(&self, values: &[f64]) -> Result<(), SpatialError> {
        if values.len() != self.points.len() {
            return Err(SpatialError::LengthMismatch {
                expected: self.points.len(),
                got: values.len(),
                field: "values".to_string(),
            });
        }
        Ok(())
    }

    /// Interpolates each field over the stations where `values` is not null.
    ///
    /// With every station present the cached triangulation is used;
    /// otherwise a transient one is built over the present stations.
    fn interpolate_fields(
        &self,
        fields: &[&[f64]],
        values: &[f64],
    ) -> Result<Vec<Vec<f64>>, SpatialError> {
        let present: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
        if present.is_empty() {
            return Err(SpatialError::AllNull);
        }

        if present.len() == values.len() {
            return fields
                .iter()
                .map(|f| {
                    self.triangulation
                        .interpolate_planned(&self.plan, f, self.mode)
                        .map_err(SpatialError::from)
                })
                .collect();
        }

        debug!(
            n_present = present.len(),
            n_stations = values.len(),
            "building transient triangulation"
        );
        let points: Vec<[f64; 2]> = present.iter().map(|&i| self.points[i]).collect();
        let transient = Triangulation::new(&points)?;
        let plan = transient.plan(&self.cells);
        fields
            .iter()
            .map(|f| {
                let subset: Vec<f64> = present.iter().map(|&i| f[i]).collect();
                transient
                    .interpolate_planned(&plan, &subset, self.mode)
                    .map_err(SpatialError::from)
            })
            .collect()
    }
}
