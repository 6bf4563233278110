//! K-nearest-neighbour search over station coordinates.
//!
//! This crate wraps an R*-tree ([`rstar`]) built once over a fixed set of
//! planar points and answers the queries used by local elevation
//! detrending:
//!
//! | Query | Returns |
//! |-------|---------|
//! | [`NeighborIndex::nearest`] | closest point to a location |
//! | [`NeighborIndex::k_nearest`] | k closest points, nearest first |
//! | [`NeighborIndex::k_nearest_where`] | k closest points passing a filter |
//! | [`NeighborIndex::neighborhoods`] | per-point neighbourhood (self + k-1 others) |
//!
//! # Quick start
//!
//! ```
//! use gridcast_knn::{KnnConfig, NeighborIndex};
//!
//! let xs = [0.0, 1000.0, 2000.0, 0.0];
//! let ys = [0.0, 0.0, 0.0, 1500.0];
//! let index = NeighborIndex::new(&xs, &ys).unwrap();
//!
//! let hoods = index.neighborhoods(&KnnConfig::new(2)).unwrap();
//! assert_eq!(hoods.get(0), &[0, 1]);
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod result;

pub use config::KnnConfig;
pub use error::KnnError;
pub use index::NeighborIndex;
pub use result::Neighborhoods;
