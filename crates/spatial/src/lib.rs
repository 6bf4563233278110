//! Elevation detrending and spatial interpolation of station data.
//!
//! This crate turns one step of scattered station values into a raster on
//! a DEM grid. Every strategy precomputes its geometry (weights,
//! triangulation, neighbour index, kriging system) once from a
//! [`StationSet`] and [`RasterGrid`] and is then called per step.
//!
//! | Strategy | Method name | Variance |
//! |----------|-------------|----------|
//! | [`Idw`] | `idw` | no |
//! | [`DetrendedKriging`] | `dk` | no |
//! | [`GridInterpolator`] | `grid` | no |
//! | [`Kriging`] | `kriging` | yes |
//!
//! Elevation detrending fits `value = slope * elevation + intercept`
//! either once over all (masked) stations ([`GlobalDetrend`]) or per
//! station over its nearest neighbours ([`LocalDetrend`]).
//!
//! # Example
//!
//! ```
//! use gridcast_spatial::{GridInterpolator, GridParams, RasterGrid, StationSet, TrendConstraint};
//! use ndarray::Array2;
//!
//! let stations = StationSet::new(
//!     vec!["low".into(), "mid".into(), "high".into()],
//!     vec![0.0, 1000.0, 0.0],
//!     vec![0.0, 0.0, 1000.0],
//!     vec![100.0, 500.0, 900.0],
//! )
//! .unwrap();
//! let dem = Array2::from_elem((2, 2), 300.0);
//! let grid = RasterGrid::from_axes(&[0.0, 400.0], &[0.0, 400.0], dem).unwrap();
//!
//! let interp = GridInterpolator::new(&stations, &grid, &GridParams::new()).unwrap();
//! let out = interp
//!     .detrended_interpolation(&[10.0, 6.0, 2.0], TrendConstraint::Unconstrained)
//!     .unwrap();
//! assert!((out[[0, 0]] - 8.0).abs() < 1e-9);
//! ```

mod detrend;
mod error;
mod grid;
mod idw;
mod kriging;
mod raster;
mod stations;
mod strategy;
mod trend;

pub use detrend::{DetrendedValues, GlobalDetrend, LocalDetrend, LocalTrends, snap_station_mask};
pub use error::SpatialError;
pub use grid::{GridInterpolator, GridParams};
pub use idw::{DEFAULT_POWER, Idw};
pub use kriging::{DetrendedKriging, Kriging, VariogramKind, VariogramModel};
pub use raster::RasterGrid;
pub use stations::StationSet;
pub use strategy::{Interpolation, Method, Strategy};
pub use trend::{Trend, TrendConstraint, fit_trend};

// Re-export the types callers need to configure strategies.
pub use gridcast_knn::{KnnError, NeighborIndex};
pub use gridcast_triangulation::{Mode, TriangulationError};
