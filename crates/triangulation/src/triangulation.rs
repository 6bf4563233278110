//! Cached triangulation with point location and scattered interpolation.

use std::fmt;

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};
use tracing::debug;

use crate::cubic::{CubicPatch, vertex_gradients};
use crate::delaunay::{check_points, triangulate};
use crate::error::TriangulationError;
use crate::mode::Mode;

/// Barycentric weights below this are still treated as inside a triangle.
const INSIDE_TOLERANCE: f64 = 1e-10;

type TriangleBox = GeomWithData<Rectangle<[f64; 2]>, usize>;
type VertexPoint = GeomWithData<[f64; 2], usize>;

/// Position of a query point inside the triangulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Index of the containing triangle.
    pub triangle: usize,
    /// Barycentric weights of the triangle's three vertices (sum to 1).
    pub weights: [f64; 3],
}

/// Precomputed point location for a fixed set of query points.
///
/// Locating queries is the expensive part of scattered interpolation and
/// does not depend on the values, so a plan is built once per raster and
/// reused for every call.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    locations: Vec<Option<Location>>,
    nearest: Vec<usize>,
    n_vertices: usize,
}

impl QueryPlan {
    /// Returns the number of query points.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if the plan holds no query points.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Returns the location of every query point (`None` outside the hull).
    pub fn locations(&self) -> &[Option<Location>] {
        &self.locations
    }

    /// Returns the nearest vertex of every query point.
    pub fn nearest(&self) -> &[usize] {
        &self.nearest
    }

    /// Returns the number of query points outside the convex hull.
    pub fn n_outside(&self) -> usize {
        self.locations.iter().filter(|l| l.is_none()).count()
    }
}

/// Planar Delaunay triangulation over a fixed point set.
///
/// # Example
///
/// ```
/// use gridcast_triangulation::{Mode, Triangulation};
///
/// let points = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0]];
/// let tri = Triangulation::new(&points).unwrap();
/// let values = [0.0, 10.0, 20.0, 30.0];
///
/// let out = tri.interpolate(&values, &[[5.0, 5.0], [20.0, 20.0]], Mode::Linear).unwrap();
/// assert!((out[0] - 15.0).abs() < 1e-9);
/// assert!(out[1].is_nan());
/// ```
#[derive(Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    triangle_tree: RTree<TriangleBox>,
    vertex_tree: RTree<VertexPoint>,
}

impl Triangulation {
    /// Builds the Delaunay triangulation of `points`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError`] if there are fewer than 3 points, a
    /// coordinate is non-finite, two points coincide, or all points are
    /// collinear.
    #[tracing::instrument(skip_all, fields(n_points = points.len()))]
    pub fn new(points: &[[f64; 2]]) -> Result<Self, TriangulationError> {
        if points.len() < 3 {
            return Err(TriangulationError::TooFewPoints { n: points.len() });
        }
        check_points(points)?;
        let triangles = triangulate(points)?;

        let boxes = triangles
            .iter()
            .enumerate()
            .map(|(t, tri)| {
                let [a, b, c] = tri.map(|i| points[i]);
                let lower = [a[0].min(b[0]).min(c[0]), a[1].min(b[1]).min(c[1])];
                let upper = [a[0].max(b[0]).max(c[0]), a[1].max(b[1]).max(c[1])];
                let pad = INSIDE_TOLERANCE * (upper[0] - lower[0]).max(upper[1] - lower[1]);
                GeomWithData::new(
                    Rectangle::from_corners(
                        [lower[0] - pad, lower[1] - pad],
                        [upper[0] + pad, upper[1] + pad],
                    ),
                    t,
                )
            })
            .collect();
        let vertices = points
            .iter()
            .enumerate()
            .map(|(i, &p)| GeomWithData::new(p, i))
            .collect();

        debug!(n_triangles = triangles.len(), "triangulation built");

        Ok(Self {
            points: points.to_vec(),
            triangles,
            triangle_tree: RTree::bulk_load(boxes),
            vertex_tree: RTree::bulk_load(vertices),
        })
    }

    /// Returns the triangulation vertices.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Returns the number of vertices.
    pub fn n_vertices(&self) -> usize {
        self.points.len()
    }

    /// Returns the triangles as counter-clockwise vertex index triples.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Returns the vertex nearest to `(x, y)`.
    pub fn nearest_vertex(&self, x: f64, y: f64) -> usize {
        self.vertex_tree
            .nearest_neighbor(&[x, y])
            .map(|v| v.data)
            .unwrap_or(0)
    }

    /// Barycentric weights of `(x, y)` with respect to triangle `t`.
    pub fn barycentric(&self, t: usize, x: f64, y: f64) -> [f64; 3] {
        let [a, b, c] = self.triangles[t].map(|i| self.points[i]);
        let denom = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
        let l1 = ((b[1] - c[1]) * (x - c[0]) + (c[0] - b[0]) * (y - c[1])) / denom;
        let l2 = ((c[1] - a[1]) * (x - c[0]) + (a[0] - c[0]) * (y - c[1])) / denom;
        [l1, l2, 1.0 - l1 - l2]
    }

    /// Finds the triangle containing `(x, y)`.
    ///
    /// Returns `None` outside the convex hull. A point on a shared edge is
    /// reported in whichever adjacent triangle is found first; both give the
    /// same linear interpolation.
    pub fn locate(&self, x: f64, y: f64) -> Option<Location> {
        let query = AABB::from_point([x, y]);
        let mut best: Option<Location> = None;
        for candidate in self.triangle_tree.locate_in_envelope_intersecting(&query) {
            let weights = self.barycentric(candidate.data, x, y);
            let min_w = weights[0].min(weights[1]).min(weights[2]);
            if min_w >= 0.0 {
                return Some(Location {
                    triangle: candidate.data,
                    weights,
                });
            }
            let best_min = best.map_or(f64::NEG_INFINITY, |b| {
                b.weights[0].min(b.weights[1]).min(b.weights[2])
            });
            if min_w >= -INSIDE_TOLERANCE && min_w > best_min {
                best = Some(Location {
                    triangle: candidate.data,
                    weights,
                });
            }
        }
        best
    }

    /// Locates every query point once for repeated interpolation.
    pub fn plan(&self, queries: &[[f64; 2]]) -> QueryPlan {
        let locations = queries.iter().map(|&[x, y]| self.locate(x, y)).collect();
        let nearest = queries
            .iter()
            .map(|&[x, y]| self.nearest_vertex(x, y))
            .collect();
        QueryPlan {
            locations,
            nearest,
            n_vertices: self.points.len(),
        }
    }

    /// Interpolates vertex `values` at `queries`.
    ///
    /// Convenience wrapper around [`Triangulation::plan`] and
    /// [`Triangulation::interpolate_planned`].
    ///
    /// # Errors
    ///
    /// See [`Triangulation::interpolate_planned`].
    pub fn interpolate(
        &self,
        values: &[f64],
        queries: &[[f64; 2]],
        mode: Mode,
    ) -> Result<Vec<f64>, TriangulationError> {
        let plan = self.plan(queries);
        self.interpolate_planned(&plan, values, mode)
    }

    /// Interpolates vertex `values` at the query points of `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError`] if `values` does not have one finite
    /// value per vertex, or if `plan` was built for another triangulation.
    pub fn interpolate_planned(
        &self,
        plan: &QueryPlan,
        values: &[f64],
        mode: Mode,
    ) -> Result<Vec<f64>, TriangulationError> {
        if plan.n_vertices != self.points.len() {
            return Err(TriangulationError::PlanMismatch {
                plan: plan.n_vertices,
                vertices: self.points.len(),
            });
        }
        if values.len() != self.points.len() {
            return Err(TriangulationError::ValueLengthMismatch {
                values: values.len(),
                vertices: self.points.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(TriangulationError::NonFiniteValue { index });
        }

        let out = match mode {
            Mode::Nearest => plan.nearest.iter().map(|&v| values[v]).collect(),
            Mode::Linear => plan
                .locations
                .iter()
                .map(|loc| match loc {
                    Some(Location { triangle, weights }) => {
                        let [a, b, c] = self.triangles[*triangle];
                        weights[0] * values[a] + weights[1] * values[b] + weights[2] * values[c]
                    }
                    None => f64::NAN,
                })
                .collect(),
            Mode::Cubic => {
                let gradients = vertex_gradients(&self.points, &self.triangles, values);
                let mut patches: Vec<Option<CubicPatch>> = vec![None; self.triangles.len()];
                plan.locations
                    .iter()
                    .map(|loc| match loc {
                        Some(Location { triangle, weights }) => patches[*triangle]
                            .get_or_insert_with(|| {
                                CubicPatch::new(
                                    self.triangles[*triangle],
                                    &self.points,
                                    values,
                                    &gradients,
                                )
                            })
                            .evaluate(*weights),
                        None => f64::NAN,
                    })
                    .collect()
            }
        };
        Ok(out)
    }
}

impl fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("n_vertices", &self.points.len())
            .field("n_triangles", &self.triangles.len())
            .finish()
    }
}
