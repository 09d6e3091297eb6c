//! Conversion of vertical terms between velocity and pressure-velocity units.
//!
//! With the hydrostatic log-pressure approximation `ω ≈ -w·p/H`:
//!
//! ```text
//! to pressure velocity:    ω = -w · p / H      (m/s  → Pa/s)
//! from pressure velocity:  w = -ω · H / p      (Pa/s → m/s)
//! ```

use ndarray::{Array3, Zip};

/// Converts a vertical term from m/s to Pa/s.
///
/// `pressure_pa` must have the same shape as `raw`; use
/// [`GridContext::pressure_3d`](crate::GridContext::pressure_3d).
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn to_pressure_velocity(
    raw: &Array3<f64>,
    pressure_pa: &Array3<f64>,
    scale_height: f64,
) -> Array3<f64> {
    Zip::from(raw)
        .and(pressure_pa)
        .map_collect(|&w, &p| -w * p / scale_height)
}

/// Converts a vertical term from Pa/s back to m/s; the inverse of
/// [`to_pressure_velocity`].
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn from_pressure_velocity(
    converted: &Array3<f64>,
    pressure_pa: &Array3<f64>,
    scale_height: f64,
) -> Array3<f64> {
    Zip::from(converted)
        .and(pressure_pa)
        .map_collect(|&omega, &p| -omega * scale_height / p)
}
