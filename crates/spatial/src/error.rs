//! Error types for the gridcast-spatial crate.

use gridcast_knn::KnnError;
use gridcast_triangulation::TriangulationError;

/// Error type for all fallible operations in the gridcast-spatial crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpatialError {
    /// Returned when a station set has no stations.
    #[error("station set is empty")]
    EmptyStations,

    /// Returned when array lengths do not match.
    #[error("length mismatch: expected {expected}, got {got} for {field}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
        /// Name of the mismatched field.
        field: String,
    },

    /// Returned when a station coordinate or elevation is NaN or infinite.
    #[error("station {id:?} has a non-finite {field}")]
    NonFiniteStation {
        /// Station identifier.
        id: String,
        /// Name of the offending field.
        field: String,
    },

    /// Returned when two stations share an identifier.
    #[error("duplicate station id {id:?}")]
    DuplicateStationId {
        /// The repeated identifier.
        id: String,
    },

    /// Returned when a raster does not match the grid shape.
    #[error("shape mismatch for {field}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Name of the mismatched raster.
        field: String,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Actual `(rows, cols)`.
        got: (usize, usize),
    },

    /// Returned when grid masking is requested but the grid carries no mask.
    #[error("grid_mask is set but the grid has no mask raster")]
    MissingMask,

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a distribution method name is not recognised.
    #[error("unknown distribution method {name:?}, expected idw, dk, grid or kriging")]
    UnknownMethod {
        /// The unrecognised name.
        name: String,
    },

    /// Returned when a trend-sign constraint is not -1, 0 or 1.
    #[error("invalid trend constraint {value}, expected -1, 0 or 1")]
    InvalidConstraint {
        /// The offending value.
        value: i64,
    },

    /// Returned when a variogram model name is not recognised.
    #[error(
        "unknown variogram model {name:?}, expected linear, spherical, exponential or gaussian"
    )]
    UnknownVariogram {
        /// The unrecognised name.
        name: String,
    },

    /// Returned when every station value of a step is null.
    #[error("all station values are null")]
    AllNull,

    /// Returned when the kriging system cannot be solved.
    #[error("kriging system is singular for {n_stations} stations")]
    SingularSystem {
        /// Number of stations in the system.
        n_stations: usize,
    },

    /// Wrapped error from the knn crate.
    #[error(transparent)]
    Knn(#[from] KnnError),

    /// Wrapped error from the triangulation crate.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_length_mismatch() {
        let e = SpatialError::LengthMismatch {
            expected: 3,
            got: 2,
            field: "values".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "length mismatch: expected 3, got 2 for values"
        );
    }

    #[test]
    fn error_shape_mismatch() {
        let e = SpatialError::ShapeMismatch {
            field: "dem".to_string(),
            expected: (4, 5),
            got: (5, 4),
        };
        assert_eq!(
            e.to_string(),
            "shape mismatch for dem: expected (4, 5), got (5, 4)"
        );
    }

    #[test]
    fn error_missing_mask() {
        assert_eq!(
            SpatialError::MissingMask.to_string(),
            "grid_mask is set but the grid has no mask raster"
        );
    }

    #[test]
    fn error_unknown_method() {
        let e = SpatialError::UnknownMethod {
            name: "spline".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unknown distribution method \"spline\", expected idw, dk, grid or kriging"
        );
    }

    #[test]
    fn error_invalid_constraint() {
        let e = SpatialError::InvalidConstraint { value: 2 };
        assert_eq!(
            e.to_string(),
            "invalid trend constraint 2, expected -1, 0 or 1"
        );
    }

    #[test]
    fn error_all_null() {
        assert_eq!(SpatialError::AllNull.to_string(), "all station values are null");
    }

    #[test]
    fn error_singular() {
        let e = SpatialError::SingularSystem { n_stations: 4 };
        assert_eq!(e.to_string(), "kriging system is singular for 4 stations");
    }

    #[test]
    fn error_wraps_triangulation() {
        let e: SpatialError = TriangulationError::Collinear.into();
        assert_eq!(
            e.to_string(),
            "points are collinear; no triangle can be formed"
        );
    }

    #[test]
    fn error_wraps_knn() {
        let e: SpatialError = KnnError::InvalidK { k: 0 }.into();
        assert_eq!(e.to_string(), "k must be >= 1, got 0");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SpatialError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SpatialError>();
    }
}
