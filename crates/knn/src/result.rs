//! Precomputed neighbourhoods.

/// Fixed-size neighbourhoods for every point of an index.
///
/// Row `i` lists point `i` itself followed by its `k - 1` nearest other
/// points, ordered by increasing distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhoods {
    /// Flat row-major `[n_points × k]` index matrix.
    indices: Vec<usize>,
    /// Points per neighbourhood.
    k: usize,
}

impl Neighborhoods {
    /// Creates a new `Neighborhoods` from a flat row-major matrix.
    pub(crate) fn new(indices: Vec<usize>, k: usize) -> Self {
        debug_assert!(k > 0 && indices.len().is_multiple_of(k));
        Self { indices, k }
    }

    /// Returns the number of points per neighbourhood.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of neighbourhoods (one per indexed point).
    pub fn len(&self) -> usize {
        self.indices.len() / self.k
    }

    /// Returns `true` if there are no neighbourhoods.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the neighbourhood of point `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn get(&self, i: usize) -> &[usize] {
        &self.indices[i * self.k..(i + 1) * self.k]
    }

    /// Iterates over all neighbourhoods in point order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.indices.chunks_exact(self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let hoods = Neighborhoods::new(vec![0, 1, 1, 0, 2, 1], 2);
        assert_eq!(hoods.k(), 2);
        assert_eq!(hoods.len(), 3);
        assert!(!hoods.is_empty());
        assert_eq!(hoods.get(0), &[0, 1]);
        assert_eq!(hoods.get(2), &[2, 1]);
    }

    #[test]
    fn test_iter_matches_get() {
        let hoods = Neighborhoods::new(vec![0, 2, 1, 2, 2, 1], 2);
        for (i, row) in hoods.iter().enumerate() {
            assert_eq!(row, hoods.get(i));
            assert_eq!(row[0], i);
        }
    }
}
