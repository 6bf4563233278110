//! Per-variable spatial distribution for gridcast.
//!
//! A [`Distribution`] owns the configuration, station subset and
//! interpolation strategy of one physical variable (air temperature,
//! precipitation, ...). It is initialised once against a station set and
//! DEM grid and then called once per time step.
//!
//! # Example
//!
//! ```
//! use gridcast_distribute::{DistributeConfig, Distribution};
//! use gridcast_spatial::{Method, RasterGrid, StationSet, TrendConstraint};
//! use ndarray::Array2;
//!
//! let stations = StationSet::new(
//!     vec!["a".into(), "b".into(), "c".into()],
//!     vec![0.0, 2000.0, 0.0],
//!     vec![0.0, 0.0, 2000.0],
//!     vec![1200.0, 1800.0, 2400.0],
//! )
//! .unwrap();
//! let grid = RasterGrid::from_axes(&[0.0, 500.0], &[0.0, 500.0], Array2::from_elem((2, 2), 1500.0))
//!     .unwrap();
//!
//! let config = DistributeConfig::new(Method::Idw)
//!     .with_detrend(TrendConstraint::NegativeOnly)
//!     .with_bounds(-5.0, 5.0);
//! let mut air_temp = Distribution::initialize("air_temp", config, &stations, &grid).unwrap();
//!
//! let out = air_temp.distribute(&[8.0, 4.0, 0.0]).unwrap();
//! assert!(out.iter().all(|&v| v == 5.0));
//! ```

mod config;
mod dispatcher;
mod error;

pub use config::{DEFAULT_LOCAL_N, DistributeConfig};
pub use dispatcher::Distribution;
pub use error::DistributeError;
