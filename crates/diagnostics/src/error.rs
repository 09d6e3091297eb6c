//! Error types for the tem-diagnostics crate.

use tem_calculus::CalculusError;

/// Error type for all fallible operations in the tem-diagnostics crate.
///
/// Every variant is fatal for the experiment being processed: it is raised
/// before any diagnostic is produced, so no partial bundle ever escapes.
/// Singular gradients are not errors; see
/// [`SingularityReport`](crate::SingularityReport).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TemError {
    /// Returned when a coordinate or field disagrees with the expected
    /// `(time, level, lat)` shape.
    #[error("shape mismatch for {name} along {axis}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Field or coordinate that failed the check.
        name: String,
        /// Axis name (`time`, `level` or `lat`).
        axis: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when an axis is too short for finite differences.
    #[error("{axis} axis has {len} sample(s), need at least {min}")]
    AxisTooShort {
        /// Axis name.
        axis: &'static str,
        /// Number of samples provided.
        len: usize,
        /// Minimum number of samples required.
        min: usize,
    },

    /// Returned when a coordinate contains a NaN or infinite value.
    #[error("{axis} coordinate has a non-finite value at index {index}")]
    NonFiniteCoordinate {
        /// Axis name.
        axis: &'static str,
        /// Index of the offending value.
        index: usize,
    },

    /// Returned when a physical constant is not a positive finite number.
    #[error("invalid constant: {reason}")]
    InvalidConstant {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when bundles cannot be joined along time.
    #[error("cannot concatenate bundles: {reason}")]
    Concatenate {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps an error from the finite-difference or integration kernels.
    #[error("calculus error: {reason}")]
    Calculus {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl From<CalculusError> for TemError {
    fn from(e: CalculusError) -> Self {
        TemError::Calculus {
            reason: e.to_string(),
        }
    }
}
