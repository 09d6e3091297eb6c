//! The TEM formula set (DynVarMIP, Gerber & Manzini 2016, appendix A).
//!
//! Notation: `φ` latitude (rad), `α = cosφ`, `p` pressure (Pa),
//! `f = 2Ω sinφ`, `a` planetary radius, `H` scale height, `p0` reference
//! pressure. Vertical terms `W` and `U′W′` enter in Pa/s.
//!
//! ```text
//! D_uphi    = (1/a) ∂(Uα)/∂φ
//! D_thp     = ∂Θ/∂p                 D_up = ∂U/∂p
//! ψ         = V′Θ′ / D_thp
//! D_psip    = ∂ψ/∂p                 D_psiy = (1/(aα)) ∂(ψα)/∂φ
//! w*        = W + D_psiy            utendw = -w* D_up
//! v*        = V - D_psip            utendv = v* (f - D_uphi)
//! Fy        = aα (D_up ψ - U′V′)
//! Fz        = aα ((f - D_uphi) ψ - U′W′)
//! ∇·F       = (1/(aα)) ∂(Fy α)/∂φ + ∂Fz/∂p
//! utendepfd = (1/(aα)) ∇·F
//! ```
//!
//! [`compute_raw`] evaluates everything in pressure coordinates.
//! [`RawTemFields::rescale`] then produces the log-pressure outputs
//!
//! ```text
//! Fy ← Fy p/p0      Fz ← -(H/p0) Fz      w* ← -(H/p) w*
//! ```
//!
//! into new arrays. The tendencies are always derived from the raw values.
//!
//! Poles (`α = 0`) and levels where `D_thp = 0` yield NaN/Inf which are
//! propagated unchanged.

use ndarray::{Array3, Zip};
use tem_calculus::gradient;
use tracing::debug;

use crate::constants::PhysicalConstants;
use crate::error::TemError;
use crate::fields::{LAT_AXIS, LEVEL_AXIS, ZonalMeanFluxes};
use crate::flux_transform::to_pressure_velocity;
use crate::grid::GridContext;

// ---------------------------------------------------------------------------
// RawTemFields
// ---------------------------------------------------------------------------

/// TEM terms in pressure coordinates, before the log-pressure rescale.
#[derive(Debug, Clone)]
pub struct RawTemFields {
    psi_eddy: Array3<f64>,
    epfy: Array3<f64>,
    epfz: Array3<f64>,
    vtem: Array3<f64>,
    wtem: Array3<f64>,
    utendepfd: Array3<f64>,
    utendvtem: Array3<f64>,
    utendwtem: Array3<f64>,
}

impl RawTemFields {
    /// Eddy stream function `ψ = V′Θ′ / ∂Θ/∂p` (Pa m/s).
    pub fn psi_eddy(&self) -> &Array3<f64> {
        &self.psi_eddy
    }

    /// Meridional E-P flux in pressure coordinates.
    pub fn epfy(&self) -> &Array3<f64> {
        &self.epfy
    }

    /// Vertical E-P flux in pressure coordinates.
    pub fn epfz(&self) -> &Array3<f64> {
        &self.epfz
    }

    /// Residual meridional velocity `v*` (m/s).
    pub fn vtem(&self) -> &Array3<f64> {
        &self.vtem
    }

    /// Residual vertical velocity `ω*` (Pa/s).
    pub fn wtem(&self) -> &Array3<f64> {
        &self.wtem
    }

    /// Zonal-wind tendency from E-P flux divergence (m/s²).
    pub fn utendepfd(&self) -> &Array3<f64> {
        &self.utendepfd
    }

    /// Zonal-wind tendency from `v*` advection and Coriolis (m/s²).
    pub fn utendvtem(&self) -> &Array3<f64> {
        &self.utendvtem
    }

    /// Zonal-wind tendency from `w*` advection (m/s²).
    pub fn utendwtem(&self) -> &Array3<f64> {
        &self.utendwtem
    }

    /// Converts to log-pressure outputs.
    ///
    /// `psitem` is the TEM mass stream function computed from the same raw
    /// eddy stream function (see
    /// [`tem_stream_function`](crate::tem_stream_function)).
    pub fn rescale(
        self,
        psitem: Array3<f64>,
        grid: &GridContext,
        constants: &PhysicalConstants,
    ) -> TemFields {
        let p0 = constants.reference_pressure();
        let h = constants.scale_height();

        let epfy = Zip::from(&self.epfy)
            .and(grid.pressure_3d())
            .map_collect(|&fy, &p| fy * p / p0);
        let epfz = self.epfz.mapv(|fz| -(h / p0) * fz);
        let wtem = Zip::from(&self.wtem)
            .and(grid.pressure_3d())
            .map_collect(|&w, &p| -(h / p) * w);

        TemFields {
            epfy,
            epfz,
            vtem: self.vtem,
            wtem,
            psitem,
            utendepfd: self.utendepfd,
            utendvtem: self.utendvtem,
            utendwtem: self.utendwtem,
        }
    }
}

// ---------------------------------------------------------------------------
// TemFields
// ---------------------------------------------------------------------------

/// Final TEM diagnostics in log-pressure form.
#[derive(Debug, Clone)]
pub struct TemFields {
    /// Northward E-P flux (m³/s²).
    pub epfy: Array3<f64>,
    /// Upward E-P flux (m²/s²).
    pub epfz: Array3<f64>,
    /// Residual northward wind (m/s).
    pub vtem: Array3<f64>,
    /// Residual upward wind (m/s).
    pub wtem: Array3<f64>,
    /// TEM mass stream function (kg/s).
    pub psitem: Array3<f64>,
    /// Tendency from E-P flux divergence (m/s²).
    pub utendepfd: Array3<f64>,
    /// Tendency from residual northward advection and Coriolis (m/s²).
    pub utendvtem: Array3<f64>,
    /// Tendency from residual upward advection (m/s²).
    pub utendwtem: Array3<f64>,
}

// ---------------------------------------------------------------------------
// compute_raw
// ---------------------------------------------------------------------------

/// Evaluates the TEM formula set in pressure coordinates.
///
/// `grid` must have been built for `fluxes` (same coordinates and shape).
///
/// # Errors
///
/// Returns [`TemError::ShapeMismatch`] if the grid does not match the
/// fluxes, or [`TemError::Calculus`] if a derivative cannot be taken.
pub fn compute_raw(
    fluxes: &ZonalMeanFluxes,
    grid: &GridContext,
    constants: &PhysicalConstants,
) -> Result<RawTemFields, TemError> {
    fluxes.coords().check_shape("grid", &grid.shape())?;

    let a = constants.planet_radius();
    let h = constants.scale_height();
    let f = fluxes.fields();
    let phi = grid.lat_rad();
    let p = grid.pressure_pa();
    let cos = grid.cos_lat_3d();
    let cor = grid.coriolis_3d();

    // m/s -> Pa/s
    let uw = to_pressure_velocity(&f.uw, grid.pressure_3d(), h);
    let w = to_pressure_velocity(&f.w, grid.pressure_3d(), h);

    let d_uphi = gradient(&(&f.u * cos), phi, LAT_AXIS)? / a;
    let d_thp = gradient(&f.theta, p, LEVEL_AXIS)?;
    let d_up = gradient(&f.u, p, LEVEL_AXIS)?;

    let psi_eddy = &f.vtheta / &d_thp;
    let d_psip = gradient(&psi_eddy, p, LEVEL_AXIS)?;
    let d_psiy = Zip::from(&gradient(&(&psi_eddy * cos), phi, LAT_AXIS)?)
        .and(cos)
        .map_collect(|&d, &c| d / (a * c));
    debug!("eddy stream function and gradients computed");

    let wtem = &w + &d_psiy;
    let utendwtem = Zip::from(&wtem)
        .and(&d_up)
        .map_collect(|&ws, &du| -ws * du);

    let vtem = &f.v - &d_psip;
    let utendvtem = Zip::from(&vtem)
        .and(cor)
        .and(&d_uphi)
        .map_collect(|&vs, &fc, &du| vs * (fc - du));

    let epfy = Zip::from(cos)
        .and(&d_up)
        .and(&psi_eddy)
        .and(&f.uv)
        .map_collect(|&c, &du, &psi, &uv| a * c * (du * psi - uv));
    let epfz = Zip::from(cos)
        .and(cor)
        .and(&d_uphi)
        .and(&psi_eddy)
        .and(&uw)
        .map_collect(|&c, &fc, &du, &psi, &uw| a * c * ((fc - du) * psi - uw));

    let d_epfy = gradient(&(&epfy * cos), phi, LAT_AXIS)?;
    let d_epfz = gradient(&epfz, p, LEVEL_AXIS)?;
    let utendepfd = Zip::from(&d_epfy)
        .and(&d_epfz)
        .and(cos)
        .map_collect(|&dy, &dz, &c| (dy / (a * c) + dz) / (a * c));
    debug!("E-P fluxes and tendencies computed");

    Ok(RawTemFields {
        psi_eddy,
        epfy,
        epfz,
        vtem,
        wtem,
        utendepfd,
        utendvtem,
        utendwtem,
    })
}
