//! Configuration for neighbourhood queries.

use crate::error::KnnError;

/// Configuration for a k-nearest-neighbour neighbourhood query.
///
/// # Example
///
/// ```
/// use gridcast_knn::KnnConfig;
///
/// let config = KnnConfig::new(5);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.k_eff(3), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnnConfig {
    /// Number of points per neighbourhood, the query point included.
    k: usize,
}

impl KnnConfig {
    /// Creates a new configuration with the given k.
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    /// Returns the configured neighbourhood size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the neighbourhood size actually used for `n_points` points.
    ///
    /// k is clamped to `[1, n_points]`; a neighbourhood can never be
    /// larger than the point set.
    pub fn k_eff(&self, n_points: usize) -> usize {
        self.k.min(n_points).max(1)
    }

    /// Validates this configuration.
    ///
    /// Returns an error if k < 1.
    pub fn validate(&self) -> Result<(), KnnError> {
        if self.k < 1 {
            return Err(KnnError::InvalidK { k: self.k });
        }
        Ok(())
    }
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self::new(1)
    }
}
