//! Physical constants used by the TEM formulas.

use crate::error::TemError;

/// Physical constants fixed for one TEM computation.
///
/// Use the builder methods to override individual values.
///
/// # Example
///
/// ```
/// use tem_diagnostics::PhysicalConstants;
///
/// // A slowly rotating planet with a shallower atmosphere.
/// let constants = PhysicalConstants::new()
///     .with_rotation_rate(7.29212e-6)
///     .with_scale_height(5000.0);
/// assert!(constants.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    reference_pressure: f64,
    planet_radius: f64,
    rotation_rate: f64,
    scale_height: f64,
    gravity: f64,
}

impl PhysicalConstants {
    /// Creates Earth constants.
    ///
    /// Defaults: `reference_pressure = 101325 Pa`, `planet_radius = 6.371e6 m`,
    /// `rotation_rate = 7.29212e-5 s⁻¹`, `scale_height = 7000 m`,
    /// `gravity = 9.80665 m s⁻²`.
    pub fn new() -> Self {
        Self {
            reference_pressure: 101_325.0,
            planet_radius: 6.371e6,
            rotation_rate: 7.29212e-5,
            scale_height: 7000.0,
            gravity: 9.80665,
        }
    }

    // --- Builder methods ---

    /// Sets the reference pressure `p0` (Pa).
    pub fn with_reference_pressure(mut self, v: f64) -> Self {
        self.reference_pressure = v;
        self
    }

    /// Sets the planetary radius `a` (m).
    pub fn with_planet_radius(mut self, v: f64) -> Self {
        self.planet_radius = v;
        self
    }

    /// Sets the rotation rate `Ω` (s⁻¹).
    pub fn with_rotation_rate(mut self, v: f64) -> Self {
        self.rotation_rate = v;
        self
    }

    /// Sets the scale height `H` (m).
    pub fn with_scale_height(mut self, v: f64) -> Self {
        self.scale_height = v;
        self
    }

    /// Sets the gravitational acceleration `g0` (m s⁻²).
    pub fn with_gravity(mut self, v: f64) -> Self {
        self.gravity = v;
        self
    }

    // --- Accessors ---

    /// Reference pressure `p0` (Pa).
    pub fn reference_pressure(&self) -> f64 {
        self.reference_pressure
    }

    /// Planetary radius `a` (m).
    pub fn planet_radius(&self) -> f64 {
        self.planet_radius
    }

    /// Rotation rate `Ω` (s⁻¹).
    pub fn rotation_rate(&self) -> f64 {
        self.rotation_rate
    }

    /// Scale height `H` (m).
    pub fn scale_height(&self) -> f64 {
        self.scale_height
    }

    /// Gravitational acceleration `g0` (m s⁻²).
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Validates the constants.
    ///
    /// The rotation rate only has to be finite (zero or negative values
    /// describe non-rotating and retrograde planets); every other constant
    /// must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), TemError> {
        if !self.rotation_rate.is_finite() {
            return Err(TemError::InvalidConstant {
                reason: format!("rotation_rate must be finite, got {}", self.rotation_rate),
            });
        }

        let checks = [
            ("reference_pressure", self.reference_pressure),
            ("planet_radius", self.planet_radius),
            ("scale_height", self.scale_height),
            ("gravity", self.gravity),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(TemError::InvalidConstant {
                    reason: format!("{name} must be finite and > 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::new()
    }
}
