//! Target raster geometry.

use ndarray::{Array1, Array2};

use crate::error::SpatialError;

/// Coordinate meshes, elevation model and optional mask of the output grid.
///
/// Rows run along y and columns along x. All rasters share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    x: Array2<f64>,
    y: Array2<f64>,
    dem: Array2<f64>,
    mask: Option<Array2<bool>>,
}

fn check_shape<T>(field: &str, expected: (usize, usize), a: &Array2<T>) -> Result<(), SpatialError> {
    if a.dim() != expected {
        return Err(SpatialError::ShapeMismatch {
            field: field.to_string(),
            expected,
            got: a.dim(),
        });
    }
    Ok(())
}

impl RasterGrid {
    /// Creates a grid from coordinate meshes and a DEM.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::ShapeMismatch`] if the rasters differ in shape.
    pub fn new(x: Array2<f64>, y: Array2<f64>, dem: Array2<f64>) -> Result<Self, SpatialError> {
        check_shape("y", x.dim(), &y)?;
        check_shape("dem", x.dim(), &dem)?;
        Ok(Self {
            x,
            y,
            dem,
            mask: None,
        })
    }

    /// Creates a grid from 1-D axes; `dem` must be `(y_axis.len(), x_axis.len())`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::ShapeMismatch`] if `dem` does not match the axes.
    pub fn from_axes(x_axis: &[f64], y_axis: &[f64], dem: Array2<f64>) -> Result<Self, SpatialError> {
        let shape = (y_axis.len(), x_axis.len());
        check_shape("dem", shape, &dem)?;
        let x = Array2::from_shape_fn(shape, |(_, c)| x_axis[c]);
        let y = Array2::from_shape_fn(shape, |(r, _)| y_axis[r]);
        Self::new(x, y, dem)
    }

    /// Attaches a mask of cells used for global detrending.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::ShapeMismatch`] if the mask differs in shape.
    pub fn with_mask(mut self, mask: Array2<bool>) -> Result<Self, SpatialError> {
        check_shape("mask", self.shape(), &mask)?;
        self.mask = Some(mask);
        Ok(self)
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.dem.dim()
    }

    /// Returns the number of cells.
    pub fn n_cells(&self) -> usize {
        self.dem.len()
    }

    /// Returns the x coordinate mesh.
    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    /// Returns the y coordinate mesh.
    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Returns the elevation model.
    pub fn dem(&self) -> &Array2<f64> {
        &self.dem
    }

    /// Returns the detrending mask, if any.
    pub fn mask(&self) -> Option<&Array2<bool>> {
        self.mask.as_ref()
    }

    /// Returns the x coordinates of the first row.
    pub fn x_axis(&self) -> Array1<f64> {
        self.x.row(0).to_owned()
    }

    /// Returns the y coordinates of the first column.
    pub fn y_axis(&self) -> Array1<f64> {
        self.y.column(0).to_owned()
    }

    /// Returns the cell centres as `[x, y]` pairs in row-major order.
    pub fn cell_points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(self.y.iter()).map(|(&x, &y)| [x, y]).collect()
    }
}

/// Reshapes row-major cell values into a raster.
pub(crate) fn to_raster(shape: (usize, usize), data: Vec<f64>) -> Result<Array2<f64>, SpatialError> {
    let got = data.len();
    Array2::from_shape_vec(shape, data).map_err(|_| SpatialError::LengthMismatch {
        expected: shape.0 * shape.1,
        got,
        field: "raster".to_string(),
    })
}
