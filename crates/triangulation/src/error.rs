//! Error types for the gridcast-triangulation crate.

/// Error type for all fallible operations in the gridcast-triangulation crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriangulationError {
    /// Returned when fewer than three points are given.
    #[error("at least 3 points are required to triangulate, got {n}")]
    TooFewPoints {
        /// Number of points provided.
        n: usize,
    },

    /// Returned when a point coordinate is NaN or infinite.
    #[error("non-finite coordinate at point {index}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },

    /// Returned when two points share the same coordinates.
    #[error("points {first} and {second} have identical coordinates")]
    DuplicatePoint {
        /// Index of the first occurrence.
        first: usize,
        /// Index of the repeated point.
        second: usize,
    },

    /// Returned when the points do not span a two-dimensional area.
    #[error("points are collinear; no triangle can be formed")]
    Collinear,

    /// Returned when the value slice does not match the vertex count.
    #[error("got {values} values for {vertices} vertices")]
    ValueLengthMismatch {
        /// Length of the value slice.
        values: usize,
        /// Number of triangulation vertices.
        vertices: usize,
    },

    /// Returned when a vertex value is NaN or infinite.
    #[error("non-finite value at vertex {index}")]
    NonFiniteValue {
        /// Index of the offending vertex.
        index: usize,
    },

    /// Returned when a query plan was built for a different triangulation.
    #[error("query plan built for {plan} vertices, triangulation has {vertices}")]
    PlanMismatch {
        /// Vertex count recorded in the plan.
        plan: usize,
        /// Vertex count of the triangulation.
        vertices: usize,
    },

    /// Returned when an interpolation mode name is not recognised.
    #[error("unknown interpolation mode {name:?}, expected nearest, linear or cubic")]
    UnknownMode {
        /// The unrecognised name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_too_few_points() {
        let e = TriangulationError::TooFewPoints { n: 2 };
        assert_eq!(
            e.to_string(),
            "at least 3 points are required to triangulate, got 2"
        );
    }

    #[test]
    fn error_duplicate_point() {
        let e = TriangulationError::DuplicatePoint {
            first: 1,
            second: 4,
        };
        assert_eq!(e.to_string(), "points 1 and 4 have identical coordinates");
    }

    #[test]
    fn error_collinear() {
        let e = TriangulationError::Collinear;
        assert_eq!(
            e.to_string(),
            "points are collinear; no triangle can be formed"
        );
    }

    #[test]
    fn error_value_length_mismatch() {
        let e = TriangulationError::ValueLengthMismatch {
            values: 3,
            vertices: 5,
        };
        assert_eq!(e.to_string(), "got 3 values for 5 vertices");
    }

    #[test]
    fn error_unknown_mode() {
        let e = TriangulationError::UnknownMode {
            name: "bicubic".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unknown interpolation mode \"bicubic\", expected nearest, linear or cubic"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<TriangulationError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<TriangulationError>();
    }
}
