//! # tem-diagnostics
//!
//! Transformed Eulerian Mean (TEM) diagnostics from zonal-mean dynamical
//! fields, following the DynVarMIP definitions (Gerber & Manzini 2016,
//! appendix A).
//!
//! # Pipeline
//!
//! 1. **Grid**: radian latitude, `cosφ`, Coriolis parameter and Pa pressure
//!    tiled onto `(time, level, lat)` ([`GridContext`])
//! 2. **Convert** `W` and `U′W′` from m/s to Pa/s ([`to_pressure_velocity`])
//! 3. **Evaluate** E-P fluxes, residual velocities and tendencies in
//!    pressure coordinates ([`compute_raw`])
//! 4. **Integrate** the TEM mass stream function ([`tem_stream_function`])
//! 5. **Rescale** E-P fluxes and `w*` to log-pressure form
//!    ([`RawTemFields::rescale`])
//! 6. **Bundle** the nine outputs with their metadata ([`DiagnosticBundle`])
//!
//! The computation is pure: inputs are never modified and no I/O is done.
//!
//! # Glossary
//!
//! - **TEM**: Transformed Eulerian Mean
//! - **E-P flux**: Eliassen-Palm flux `(Fy, Fz)`
//! - **v\*, w\***: residual (TEM) meridional and vertical velocities
//! - **ψ**: eddy stream function `V′Θ′ / ∂Θ/∂p`
//!
//! # Quick start
//!
//! ```
//! use ndarray::Array3;
//! use tem_diagnostics::{
//!     Coordinates, DiagnosticKind, FluxFields, LevelUnits, PhysicalConstants, ZonalMeanFluxes,
//!     compute_tem,
//! };
//!
//! let shape = (1, 2, 2);
//! let coords = Coordinates::new(vec![0.0], vec![500.0, 1000.0], LevelUnits::Hpa, vec![-30.0, 30.0]);
//! let zero = Array3::<f64>::zeros(shape);
//! let fields = FluxFields {
//!     u: Array3::from_elem(shape, 10.0),
//!     theta: Array3::from_shape_fn(shape, |(_, k, _)| 350.0 - 50.0 * k as f64),
//!     v: Array3::from_elem(shape, 1.0),
//!     w: zero.clone(),
//!     uv: zero.clone(),
//!     uw: zero.clone(),
//!     vtheta: zero,
//! };
//! let data = ZonalMeanFluxes::new(coords, fields).unwrap();
//!
//! let result = compute_tem(&data, &PhysicalConstants::new()).unwrap();
//! let vtem = result.bundle().get(DiagnosticKind::Vtem);
//! assert_eq!(vtem.data()[[0, 1, 0]], 1.0);
//! ```

mod bundle;
mod constants;
mod error;
mod fields;
mod flux_transform;
mod grid;
mod result;
mod singularity;
mod streamfunction;
mod tem;

pub use bundle::{DiagnosticBundle, DiagnosticField, DiagnosticKind};
pub use constants::PhysicalConstants;
pub use error::TemError;
pub use fields::{
    Coordinates, FluxFields, LAT_AXIS, LEVEL_AXIS, LevelUnits, TIME_AXIS, ZonalMeanFluxes,
};
pub use flux_transform::{from_pressure_velocity, to_pressure_velocity};
pub use grid::GridContext;
pub use result::TemResult;
pub use singularity::SingularityReport;
pub use streamfunction::{integrate_from_top, tem_stream_function};
pub use tem::{RawTemFields, TemFields, compute_raw};

use tracing::{debug, warn};

/// Computes the full TEM diagnostic set for one experiment.
///
/// Non-finite values (poles, `∂Θ/∂p = 0`) do not fail the computation;
/// they are counted in [`TemResult::singularities`] and logged as a
/// warning.
///
/// # Errors
///
/// Returns [`TemError`] if the constants are invalid, a coordinate does
/// not match the fields, or an axis is too short to differentiate. No
/// output is produced in that case.
pub fn compute_tem(
    fluxes: &ZonalMeanFluxes,
    constants: &PhysicalConstants,
) -> Result<TemResult, TemError> {
    constants.validate()?;

    let [n_time, n_level, n_lat] = fluxes.shape();
    debug!(n_time, n_level, n_lat, "computing TEM diagnostics");

    let grid = GridContext::new(fluxes.coords(), fluxes.shape(), constants)?;
    let raw = compute_raw(fluxes, &grid, constants)?;
    let psitem = tem_stream_function(&fluxes.fields().v, raw.psi_eddy(), &grid, constants)?;
    let tem = raw.rescale(psitem, &grid, constants);

    let bundle = DiagnosticBundle::new(fluxes.coords().clone(), fluxes.fields().u.clone(), tem);
    let singularities = SingularityReport::scan(&bundle);
    if !singularities.is_clean() {
        warn!(
            total = singularities.total(),
            fields = %singularities,
            "non-finite TEM diagnostics (poles or neutral stratification)"
        );
    }

    Ok(TemResult::new(bundle, singularities))
}

/// Like [`compute_tem`], but processes at most `chunk` time steps at a
/// time and joins the pieces. A `chunk` of zero, or one covering the whole
/// record, runs [`compute_tem`] directly without copying the input.
///
/// No formula couples time steps, so the result is identical to the
/// unchunked computation.
///
/// # Errors
///
/// See [`compute_tem`].
pub fn compute_tem_chunked(
    fluxes: &ZonalMeanFluxes,
    constants: &PhysicalConstants,
    chunk: usize,
) -> Result<TemResult, TemError> {
    let [n_time, _, _] = fluxes.shape();
    if chunk == 0 || chunk >= n_time {
        return compute_tem(fluxes, constants);
    }

    let ranges = fluxes.time_chunk_ranges(chunk);
    let n_chunks = ranges.len();
    let mut bundles = Vec::with_capacity(n_chunks);
    let mut singularities = SingularityReport::default();
    for (i, range) in ranges.into_iter().enumerate() {
        debug!(chunk = i + 1, n_chunks, "processing time chunk");
        let piece = fluxes.slice_time(range);
        let result = compute_tem(&piece, constants)?;
        singularities.merge(result.singularities());
        bundles.push(result.into_bundle());
    }

    Ok(TemResult::new(
        DiagnosticBundle::concat_time(bundles)?,
        singularities,
    ))
}
