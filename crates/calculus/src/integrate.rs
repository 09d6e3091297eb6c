//! Cumulative trapezoidal integration along one axis.

use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Zip};

use crate::check_axis;
use crate::error::CalculusError;

/// Running trapezoidal integral of `field` along `axis` with respect to
/// `coord`.
///
/// Follows SciPy's `cumulative_trapezoid` without an initial value: the
/// output is one sample shorter than the input along `axis`, and element
/// `k` holds the integral from `coord[0]` to `coord[k + 1]`. Callers that
/// need an output aligned with the input prepend a sample at the lower
/// integration limit before calling.
///
/// # Errors
///
/// Returns [`CalculusError`] if `axis` is out of range, `coord` does not
/// match the axis length, the axis has fewer than two samples, or `coord`
/// contains non-finite values.
pub fn cumulative_trapezoid<S, D>(
    field: &ArrayBase<S, D>,
    coord: &[f64],
    axis: Axis,
) -> Result<Array<f64, D>, CalculusError>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    check_axis(field.shape(), coord, axis.index())?;

    let mut dim = field.raw_dim();
    dim[axis.index()] -= 1;
    let mut out = Array::zeros(dim);

    Zip::from(out.lanes_mut(axis))
        .and(field.lanes(axis))
        .for_each(|mut dst, src| {
            let mut acc = 0.0;
            for (k, w) in coord.windows(2).enumerate() {
                acc += (w[1] - w[0]) * (src[k] + src[k + 1]) / 2.0;
                dst[k] = acc;
            }
        });
    Ok(out)
}
