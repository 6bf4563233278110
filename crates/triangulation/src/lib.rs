//! Planar Delaunay triangulation and scattered interpolation.
//!
//! A [`Triangulation`] is built once over a fixed set of station points and
//! then interpolates any number of value vectors onto arbitrary query points.
//! Point location uses an R*-tree ([`rstar`]) over triangle bounding boxes;
//! a [`QueryPlan`] caches the located query points so that repeated calls
//! only pay for the arithmetic.
//!
//! | Mode | Inside hull | Outside hull |
//! |------|-------------|--------------|
//! | [`Mode::Nearest`] | nearest vertex value | nearest vertex value |
//! | [`Mode::Linear`] | barycentric combination | NaN |
//! | [`Mode::Cubic`] | Clough–Tocher cubic | NaN |
//!
//! # Quick start
//!
//! ```
//! use gridcast_triangulation::{Mode, Triangulation};
//!
//! let stations = [[0.0, 0.0], [1000.0, 0.0], [0.0, 1000.0]];
//! let tri = Triangulation::new(&stations).unwrap();
//!
//! let cells = [[250.0, 250.0], [-5000.0, 5000.0]];
//! let plan = tri.plan(&cells);
//! let out = tri.interpolate_planned(&plan, &[1.0, 2.0, 3.0], Mode::Nearest).unwrap();
//! assert_eq!(out, vec![1.0, 3.0]);
//! ```

mod cubic;
mod delaunay;
pub mod error;
pub mod mode;
pub mod triangulation;

pub use error::TriangulationError;
pub use mode::Mode;
pub use triangulation::{Location, QueryPlan, Triangulation};
