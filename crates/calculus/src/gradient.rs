//! Centered finite differences on a non-uniform coordinate.
//!
//! Matches NumPy's `gradient(f, x, axis=k)` with `edge_order = 1`:
//!
//! ```text
//! interior:  f'[i] = a·f[i-1] + b·f[i] + c·f[i+1]
//!            a = -h₊ / (h₋ (h₋ + h₊))
//!            b = (h₊ - h₋) / (h₋ h₊)
//!            c =  h₋ / (h₊ (h₋ + h₊))
//! edges:     f'[0]   = (f[1] - f[0]) / h₀
//!            f'[n-1] = (f[n-1] - f[n-2]) / h_{n-2}
//! ```
//!
//! where `h₋ = x[i] - x[i-1]` and `h₊ = x[i+1] - x[i]`. On a uniform
//! coordinate the interior reduces to `(f[i+1] - f[i-1]) / 2h`, which is
//! evaluated directly so uniform grids see no extra rounding.

use ndarray::{Array, ArrayBase, ArrayView1, ArrayViewMut1, Axis, Data, Dimension, Zip};

use crate::check_axis;
use crate::error::CalculusError;

/// Differentiates `field` along `axis` with respect to `coord`.
///
/// The result has the same shape as `field`. Each lane along `axis` is
/// differentiated independently.
///
/// # Errors
///
/// Returns [`CalculusError`] if `axis` is out of range, `coord` does not
/// match the axis length, the axis has fewer than two samples, or `coord`
/// contains non-finite values or repeated neighbours.
pub fn gradient<S, D>(
    field: &ArrayBase<S, D>,
    coord: &[f64],
    axis: Axis,
) -> Result<Array<f64, D>, CalculusError>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    check_axis(field.shape(), coord, axis.index())?;
    let stencil = Stencil::new(coord)?;

    let mut out = Array::zeros(field.raw_dim());
    Zip::from(out.lanes_mut(axis))
        .and(field.lanes(axis))
        .for_each(|dst, src| stencil.apply(src, dst));
    Ok(out)
}

/// Precomputed difference weights for one coordinate.
#[derive(Debug)]
struct Stencil {
    /// `x[i+1] - x[i]` for every neighbouring pair.
    spacing: Vec<f64>,
    /// Interior weights `(a, b, c)`; `None` on a uniform coordinate.
    weights: Option<Vec<[f64; 3]>>,
}

impl Stencil {
    fn new(coord: &[f64]) -> Result<Self, CalculusError> {
        let spacing: Vec<f64> = coord.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(index) = spacing.iter().position(|&h| h == 0.0) {
            return Err(CalculusError::ZeroSpacing { index });
        }

        let uniform = spacing.iter().all(|&h| h == spacing[0]);
        let weights: Option<Vec<[f64; 3]>> = (!uniform).then(|| {
            spacing
                .windows(2)
                .map(|h| {
                    let (hm, hp) = (h[0], h[1]);
                    [
                        -hp / (hm * (hm + hp)),
                        (hp - hm) / (hm * hp),
                        hm / (hp * (hm + hp)),
                    ]
                })
                .collect()
        });

        Ok(Self { spacing, weights })
    }

    fn apply(&self, src: ArrayView1<'_, f64>, mut dst: ArrayViewMut1<'_, f64>) {
        let n = src.len();
        dst[0] = (src[1] - src[0]) / self.spacing[0];
        dst[n - 1] = (src[n - 1] - src[n - 2]) / self.spacing[n - 2];

        match &self.weights {
            Some(weights) => {
                for (i, [a, b, c]) in (1..n - 1).zip(weights) {
                    dst[i] = a * src[i - 1] + b * src[i] + c * src[i + 1];
                }
            }
            None => {
                let two_h = 2.0 * self.spacing[0];
                for i in 1..n - 1 {
                    dst[i] = (src[i + 1] - src[i - 1]) / two_h;
                }
            }
        }
    }
}
