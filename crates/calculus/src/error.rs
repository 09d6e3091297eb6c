//! Error types for the tem-calculus crate.

/// Error type for all fallible operations in the tem-calculus crate.
///
/// Every variant describes a mismatch between a field and the coordinate it
/// is differentiated or integrated against; the numerical kernels themselves
/// never fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculusError {
    /// Returned when the requested axis does not exist on the field.
    #[error("axis {axis} out of range for a {ndim}-dimensional field")]
    AxisOutOfRange {
        /// Requested axis index.
        axis: usize,
        /// Number of dimensions of the field.
        ndim: usize,
    },

    /// Returned when the coordinate length differs from the axis length.
    #[error("coordinate length mismatch on axis {axis}: expected {expected}, got {got}")]
    CoordinateLength {
        /// Axis the coordinate belongs to.
        axis: usize,
        /// Length of the field along `axis`.
        expected: usize,
        /// Length of the coordinate slice.
        got: usize,
    },

    /// Returned when the axis has too few samples for the operation.
    #[error("too few samples: got {len}, need at least {min}")]
    TooFewSamples {
        /// Number of samples along the axis.
        len: usize,
        /// Minimum number of samples required.
        min: usize,
    },

    /// Returned when a coordinate value is NaN or infinite.
    #[error("coordinate value at index {index} is not finite")]
    NonFiniteCoordinate {
        /// Index of the offending value.
        index: usize,
    },

    /// Returned when two neighbouring coordinate values coincide.
    #[error("zero coordinate spacing between index {index} and {}", index + 1)]
    ZeroSpacing {
        /// Index of the first of the two coincident values.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_axis_out_of_range() {
        let e = CalculusError::AxisOutOfRange { axis: 3, ndim: 3 };
        assert_eq!(e.to_string(), "axis 3 out of range for a 3-dimensional field");
    }

    #[test]
    fn display_coordinate_length() {
        let e = CalculusError::CoordinateLength {
            axis: 1,
            expected: 70,
            got: 71,
        };
        assert_eq!(
            e.to_string(),
            "coordinate length mismatch on axis 1: expected 70, got 71"
        );
    }

    #[test]
    fn display_too_few_samples() {
        let e = CalculusError::TooFewSamples { len: 1, min: 2 };
        assert_eq!(e.to_string(), "too few samples: got 1, need at least 2");
    }

    #[test]
    fn display_non_finite_coordinate() {
        let e = CalculusError::NonFiniteCoordinate { index: 4 };
        assert_eq!(e.to_string(), "coordinate value at index 4 is not finite");
    }

    #[test]
    fn display_zero_spacing() {
        let e = CalculusError::ZeroSpacing { index: 2 };
        assert_eq!(e.to_string(), "zero coordinate spacing between index 2 and 3");
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<CalculusError>();
    }
}
