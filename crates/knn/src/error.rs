//! Error types for the gridcast-knn crate.

/// Error type for all fallible operations in the gridcast-knn crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnnError {
    /// Returned when no points are provided.
    #[error("no points provided")]
    EmptyPoints,

    /// Returned when k is zero.
    #[error("k must be >= 1, got {k}")]
    InvalidK {
        /// The invalid k value.
        k: usize,
    },

    /// Returned when the x and y coordinate slices differ in length.
    #[error("coordinate length mismatch: {x} x values, {y} y values")]
    CoordinateLengthMismatch {
        /// Length of the x slice.
        x: usize,
        /// Length of the y slice.
        y: usize,
    },

    /// Returned when a coordinate is NaN or infinite.
    #[error("non-finite coordinate at point {index}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_points() {
        let e = KnnError::EmptyPoints;
        assert_eq!(e.to_string(), "no points provided");
    }

    #[test]
    fn error_invalid_k() {
        let e = KnnError::InvalidK { k: 0 };
        assert_eq!(e.to_string(), "k must be >= 1, got 0");
    }

    #[test]
    fn error_length_mismatch() {
        let e = KnnError::CoordinateLengthMismatch { x: 3, y: 2 };
        assert_eq!(
            e.to_string(),
            "coordinate length mismatch: 3 x values, 2 y values"
        );
    }

    #[test]
    fn error_non_finite_coordinate() {
        let e = KnnError::NonFiniteCoordinate { index: 4 };
        assert_eq!(e.to_string(), "non-finite coordinate at point 4");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<KnnError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<KnnError>();
    }
}
