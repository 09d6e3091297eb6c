//! Latitude/pressure geometry tiled onto the `(time, level, lat)` shape.

use ndarray::Array3;

use crate::constants::PhysicalConstants;
use crate::error::TemError;
use crate::fields::Coordinates;

/// Geometry derived from the 1-D coordinates.
///
/// Holds the 1-D radian latitude and Pa pressure used as finite-difference
/// coordinates, and explicit 3-D copies of `cosφ`, `f = 2Ω sinφ` and `p`
/// whose element `[t, k, j]` belongs to level `k` and latitude `j`.
#[derive(Debug, Clone)]
pub struct GridContext {
    shape: [usize; 3],
    lat_rad: Vec<f64>,
    pressure_pa: Vec<f64>,
    coriolis: Vec<f64>,
    lat_rad_3d: Array3<f64>,
    cos_lat_3d: Array3<f64>,
    coriolis_3d: Array3<f64>,
    pressure_3d: Array3<f64>,
}

impl GridContext {
    /// Builds the grid for fields of `shape = [n_time, n_level, n_lat]`.
    ///
    /// Levels keep the caller's order and are converted to Pa with the
    /// coordinate's [`LevelUnits`](crate::LevelUnits).
    ///
    /// # Errors
    ///
    /// - [`TemError::ShapeMismatch`] if a coordinate length disagrees with
    ///   `shape`.
    /// - [`TemError::AxisTooShort`] if the level or latitude axis has fewer
    ///   than two samples.
    /// - [`TemError::NonFiniteCoordinate`] if a level or latitude is NaN or
    ///   infinite.
    pub fn new(
        coords: &Coordinates,
        shape: [usize; 3],
        constants: &PhysicalConstants,
    ) -> Result<Self, TemError> {
        coords.check_shape("coordinates", &shape)?;
        check_axis("level", coords.level())?;
        check_axis("lat", coords.lat())?;

        let lat_rad: Vec<f64> = coords.lat().iter().map(|d| d.to_radians()).collect();
        let coriolis: Vec<f64> = lat_rad
            .iter()
            .map(|phi| 2.0 * constants.rotation_rate() * phi.sin())
            .collect();
        let to_pa = coords.level_units().pa_per_unit();
        let pressure_pa: Vec<f64> = coords.level().iter().map(|p| p * to_pa).collect();

        let dims = (shape[0], shape[1], shape[2]);
        let lat_rad_3d = Array3::from_shape_fn(dims, |(_, _, j)| lat_rad[j]);
        let cos_lat_3d = Array3::from_shape_fn(dims, |(_, _, j)| lat_rad[j].cos());
        let coriolis_3d = Array3::from_shape_fn(dims, |(_, _, j)| coriolis[j]);
        let pressure_3d = Array3::from_shape_fn(dims, |(_, k, _)| pressure_pa[k]);

        Ok(Self {
            shape,
            lat_rad,
            pressure_pa,
            coriolis,
            lat_rad_3d,
            cos_lat_3d,
            coriolis_3d,
            pressure_3d,
        })
    }

    /// `[n_time, n_level, n_lat]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Latitude in radians (1-D).
    pub fn lat_rad(&self) -> &[f64] {
        &self.lat_rad
    }

    /// Pressure in Pa (1-D).
    pub fn pressure_pa(&self) -> &[f64] {
        &self.pressure_pa
    }

    /// Coriolis parameter `2Ω sinφ` (1-D, s⁻¹).
    pub fn coriolis(&self) -> &[f64] {
        &self.coriolis
    }

    /// Latitude in radians tiled to the field shape.
    pub fn lat_rad_3d(&self) -> &Array3<f64> {
        &self.lat_rad_3d
    }

    /// `cosφ` tiled to the field shape.
    pub fn cos_lat_3d(&self) -> &Array3<f64> {
        &self.cos_lat_3d
    }

    /// Coriolis parameter tiled to the field shape.
    pub fn coriolis_3d(&self) -> &Array3<f64> {
        &self.coriolis_3d
    }

    /// Pressure in Pa tiled to the field shape.
    pub fn pressure_3d(&self) -> &Array3<f64> {
        &self.pressure_3d
    }
}

fn check_axis(axis: &'static str, values: &[f64]) -> Result<(), TemError> {
    if values.len() < 2 {
        return Err(TemError::AxisTooShort {
            axis,
            len: values.len(),
            min: 2,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(TemError::NonFiniteCoordinate { axis, index });
    }
    Ok(())
}
