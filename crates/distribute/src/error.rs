//! Error types for the gridcast-distribute crate.

use gridcast_spatial::SpatialError;

/// Error type for all fallible operations in the gridcast-distribute crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DistributeError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a value row does not match the variable's stations.
    #[error("{name}: expected {expected} station values, got {got}")]
    LengthMismatch {
        /// Variable name.
        name: String,
        /// Number of stations of the variable.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when every station value of a step is null.
    #[error("{name}: all station values are null")]
    AllNull {
        /// Variable name.
        name: String,
    },

    /// Wrapped error from the spatial crate.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}
