//! TEM mass stream function.
//!
//! ```text
//! ψ_TEM = (2π a cosφ / g0) · ( ∫₀ᵖ V dp′ − ψ )
//! ```
//!
//! The integral runs from the top of the atmosphere (p = 0) to each level.
//! A synthetic level with `V = 0` at `p = 0` is placed in front of the
//! first level so the cumulative trapezoid lines up index for index with
//! the real levels; the first level then receives the single trapezoid
//! between p = 0 and itself.

use std::f64::consts::PI;

use ndarray::{Array3, Zip, concatenate};
use tem_calculus::cumulative_trapezoid;

use crate::constants::PhysicalConstants;
use crate::error::TemError;
use crate::fields::LEVEL_AXIS;
use crate::grid::GridContext;

/// Cumulative pressure integral `∫₀ᵖ V dp′` at every level.
///
/// # Errors
///
/// Returns [`TemError`] if `v` does not match the grid shape or the padded
/// pressure coordinate is degenerate.
pub fn integrate_from_top(v: &Array3<f64>, grid: &GridContext) -> Result<Array3<f64>, TemError> {
    let [n_time, _, n_lat] = grid.shape();

    let top = Array3::<f64>::zeros((n_time, 1, n_lat));
    let padded = concatenate(LEVEL_AXIS, &[top.view(), v.view()]).map_err(|e| {
        TemError::Calculus {
            reason: format!("cannot pad meridional wind: {e}"),
        }
    })?;

    let mut pressure = Vec::with_capacity(grid.pressure_pa().len() + 1);
    pressure.push(0.0);
    pressure.extend_from_slice(grid.pressure_pa());

    Ok(cumulative_trapezoid(&padded, &pressure, LEVEL_AXIS)?)
}

/// TEM mass stream function (kg/s) from the meridional wind `v` and the
/// eddy stream function `psi_eddy`.
///
/// # Errors
///
/// See [`integrate_from_top`].
pub fn tem_stream_function(
    v: &Array3<f64>,
    psi_eddy: &Array3<f64>,
    grid: &GridContext,
    constants: &PhysicalConstants,
) -> Result<Array3<f64>, TemError> {
    let integral = integrate_from_top(v, grid)?;
    let scale = 2.0 * PI * constants.planet_radius() / constants.gravity();

    Ok(Zip::from(&integral)
        .and(psi_eddy)
        .and(grid.cos_lat_3d())
        .map_collect(|&int_v, &psi, &cos| scale * cos * (int_v - psi)))
}
