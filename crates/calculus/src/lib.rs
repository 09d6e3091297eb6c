//! # tem-calculus
//!
//! Finite-difference derivatives and cumulative integrals along one axis of
//! an `ndarray` field, with the axis sampled on an arbitrary (possibly
//! non-uniform) 1-D coordinate.
//!
//! | Operation | Interior | Boundaries |
//! |-----------|----------|------------|
//! | [`gradient`] | second-order centered difference | first-order one-sided |
//! | [`cumulative_trapezoid`] | running trapezoid sum | output is one sample shorter |
//!
//! Both operations work lane by lane: every 1-D lane of the input along the
//! chosen axis is treated independently, so a `(time, level, lat)` field can
//! be differentiated along `level` or `lat` without reshaping.
//!
//! # Quick start
//!
//! ```
//! use ndarray::{Axis, array};
//! use tem_calculus::gradient;
//!
//! let x = [0.0, 1.0, 2.0];
//! let f = array![[0.0, 2.0, 4.0]];
//! let df = gradient(&f, &x, Axis(1)).unwrap();
//! assert_eq!(df, array![[2.0, 2.0, 2.0]]);
//! ```

mod error;
mod gradient;
mod integrate;

pub use error::CalculusError;
pub use gradient::gradient;
pub use integrate::cumulative_trapezoid;

/// Checks that `coord` can serve as the sample positions of `axis` for a
/// field of `shape`.
///
/// Shared by [`gradient`] and [`cumulative_trapezoid`].
pub(crate) fn check_axis(shape: &[usize], coord: &[f64], axis: usize) -> Result<(), CalculusError> {
    if axis >= shape.len() {
        return Err(CalculusError::AxisOutOfRange {
            axis,
            ndim: shape.len(),
        });
    }
    if shape[axis] != coord.len() {
        return Err(CalculusError::CoordinateLength {
            axis,
            expected: shape[axis],
            got: coord.len(),
        });
    }
    if coord.len() < 2 {
        return Err(CalculusError::TooFewSamples {
            len: coord.len(),
            min: 2,
        });
    }
    if let Some(index) = coord.iter().position(|v| !v.is_finite()) {
        return Err(CalculusError::NonFiniteCoordinate { index });
    }
    Ok(())
}
