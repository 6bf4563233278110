//! R*-tree backed nearest-neighbour index over planar points.

use std::fmt;

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::config::KnnConfig;
use crate::error::KnnError;
use crate::result::Neighborhoods;

/// A point tagged with its position in the input order.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-neighbour index over a fixed set of planar points.
///
/// Built once from station coordinates and queried read-only afterwards.
///
/// # Example
///
/// ```
/// use gridcast_knn::NeighborIndex;
///
/// let index = NeighborIndex::new(&[0.0, 10.0, 20.0], &[0.0, 0.0, 0.0]).unwrap();
/// assert_eq!(index.nearest(9.0, 1.0), Some(1));
/// assert_eq!(index.k_nearest(0.0, 0.0, 2), vec![0, 1]);
/// ```
#[derive(Clone)]
pub struct NeighborIndex {
    tree: RTree<IndexedPoint>,
    points: Vec<[f64; 2]>,
}

impl NeighborIndex {
    /// Bulk-loads an index over the points `(xs[i], ys[i])`.
    ///
    /// # Errors
    ///
    /// Returns [`KnnError`] if the slices are empty, differ in length, or
    /// contain a non-finite coordinate.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, KnnError> {
        if xs.len() != ys.len() {
            return Err(KnnError::CoordinateLengthMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(KnnError::EmptyPoints);
        }

        let mut points = Vec::with_capacity(xs.len());
        for (index, (&x, &y)) in xs.iter().zip(ys.iter()).enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(KnnError::NonFiniteCoordinate { index });
            }
            points.push([x, y]);
        }

        let elements = points
            .iter()
            .enumerate()
            .map(|(i, &p)| GeomWithData::new(p, i))
            .collect();

        Ok(Self {
            tree: RTree::bulk_load(elements),
            points,
        })
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the coordinates of point `i`.
    pub fn point(&self, i: usize) -> [f64; 2] {
        self.points[i]
    }

    /// Returns the index of the point nearest to `(x, y)`.
    pub fn nearest(&self, x: f64, y: f64) -> Option<usize> {
        self.tree.nearest_neighbor(&[x, y]).map(|p| p.data)
    }

    /// Returns up to `k` point indices ordered by increasing distance from `(x, y)`.
    pub fn k_nearest(&self, x: f64, y: f64, k: usize) -> Vec<usize> {
        self.k_nearest_where(x, y, k, |_| true)
    }

    /// Returns the `k` nearest points accepted by `keep`, nearest first.
    ///
    /// Rejected points are skipped without shrinking the result, so the
    /// index can be reused when some points carry no data.
    pub fn k_nearest_where<F>(&self, x: f64, y: f64, k: usize, mut keep: F) -> Vec<usize>
    where
        F: FnMut(usize) -> bool,
    {
        self.tree
            .nearest_neighbor_iter(&[x, y])
            .map(|p| p.data)
            .filter(|&i| keep(i))
            .take(k)
            .collect()
    }

    /// Returns the Euclidean distance between point `i` and `(x, y)`.
    pub fn distance(&self, i: usize, x: f64, y: f64) -> f64 {
        let [px, py] = self.points[i];
        ((px - x) * (px - x) + (py - y) * (py - y)).sqrt()
    }

    /// Computes the neighbourhood of every indexed point.
    ///
    /// Each neighbourhood holds the point itself followed by its
    /// `k_eff - 1` nearest other points, where `k_eff` is `config.k()`
    /// clamped to the number of points. The point counts as its own
    /// nearest neighbour at distance zero, as a k-d tree query for an
    /// indexed point returns it, so `k` includes the point itself.
    ///
    /// # Errors
    ///
    /// Returns [`KnnError::InvalidK`] if the configuration is invalid.
    pub fn neighborhoods(&self, config: &KnnConfig) -> Result<Neighborhoods, KnnError> {
        config.validate()?;
        let k_eff = config.k_eff(self.len());

        let mut indices = Vec::with_capacity(self.len() * k_eff);
        for (i, &[x, y]) in self.points.iter().enumerate() {
            indices.push(i);
            indices.extend(self.k_nearest_where(x, y, k_eff - 1, |j| j != i));
        }

        Ok(Neighborhoods::new(indices, k_eff))
    }
}

impl fmt::Debug for NeighborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeighborIndex")
            .field("n_points", &self.points.len())
            .finish()
    }
}
