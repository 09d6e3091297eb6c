//! Input data model: shared coordinates and the zonal-mean flux fields.
//!
//! Every 3-D array in this crate uses the axis order `(time, level, lat)`.

use std::ops::Range;

use ndarray::{Array3, Axis, s};

use crate::error::TemError;

/// Axis index of time in every 3-D field.
pub const TIME_AXIS: Axis = Axis(0);
/// Axis index of the vertical level in every 3-D field.
pub const LEVEL_AXIS: Axis = Axis(1);
/// Axis index of latitude in every 3-D field.
pub const LAT_AXIS: Axis = Axis(2);

// ---------------------------------------------------------------------------
// LevelUnits
// ---------------------------------------------------------------------------

/// Unit of the vertical level coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelUnits {
    /// Pascal.
    #[default]
    Pa,
    /// Hectopascal (millibar), as stored in most model `ilev`/`lev` axes.
    Hpa,
}

impl LevelUnits {
    /// Multiplier converting a level value into Pa.
    pub fn pa_per_unit(self) -> f64 {
        match self {
            Self::Pa => 1.0,
            Self::Hpa => 100.0,
        }
    }

    /// Unit string as written to CF `units` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pa => "Pa",
            Self::Hpa => "hPa",
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// The 1-D coordinates shared by all input and output fields.
///
/// Values are stored exactly as provided (latitude in degrees, level in
/// `level_units`) so that outputs carry the same coordinates as the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    time: Vec<f64>,
    level: Vec<f64>,
    level_units: LevelUnits,
    lat: Vec<f64>,
}

impl Coordinates {
    /// Creates a coordinate set. No checks are made here; consistency with
    /// field shapes is verified by [`ZonalMeanFluxes::new`] and
    /// [`GridContext::new`](crate::GridContext::new).
    pub fn new(time: Vec<f64>, level: Vec<f64>, level_units: LevelUnits, lat: Vec<f64>) -> Self {
        Self {
            time,
            level,
            level_units,
            lat,
        }
    }

    /// Time values, in whatever units the reader resolved.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Level values in [`level_units`](Self::level_units).
    pub fn level(&self) -> &[f64] {
        &self.level
    }

    /// Unit of the level coordinate.
    pub fn level_units(&self) -> LevelUnits {
        self.level_units
    }

    /// Latitudes in degrees north.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// `[n_time, n_level, n_lat]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.time.len(), self.level.len(), self.lat.len()]
    }

    pub(crate) fn slice_time(&self, range: Range<usize>) -> Self {
        Self {
            time: self.time[range].to_vec(),
            level: self.level.clone(),
            level_units: self.level_units,
            lat: self.lat.clone(),
        }
    }

    /// Checks `shape` against the coordinate lengths.
    pub(crate) fn check_shape(&self, name: &str, shape: &[usize]) -> Result<(), TemError> {
        for ((axis, expected), &got) in ["time", "level", "lat"]
            .into_iter()
            .zip(self.shape())
            .zip(shape)
        {
            if expected != got {
                return Err(TemError::ShapeMismatch {
                    name: name.to_string(),
                    axis,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FluxFields
// ---------------------------------------------------------------------------

/// The seven zonal-mean quantities consumed by the TEM formulas.
///
/// Vertical terms (`w`, `uw`) are in velocity units (m/s); they are
/// converted to pressure velocity inside the computation.
#[derive(Debug, Clone)]
pub struct FluxFields {
    /// Zonal-mean zonal wind `U` (m/s).
    pub u: Array3<f64>,
    /// Zonal-mean potential temperature `Θ` (K).
    pub theta: Array3<f64>,
    /// Zonal-mean meridional wind `V` (m/s).
    pub v: Array3<f64>,
    /// Zonal-mean vertical wind `W` (m/s).
    pub w: Array3<f64>,
    /// Eddy momentum flux `U′V′` (m²/s²).
    pub uv: Array3<f64>,
    /// Eddy vertical momentum flux `U′W′` (m²/s²).
    pub uw: Array3<f64>,
    /// Eddy heat flux `V′Θ′` (K m/s).
    pub vtheta: Array3<f64>,
}

impl FluxFields {
    fn named(&self) -> [(&'static str, &Array3<f64>); 7] {
        [
            ("u", &self.u),
            ("theta", &self.theta),
            ("v", &self.v),
            ("w", &self.w),
            ("uv", &self.uv),
            ("uw", &self.uw),
            ("vtheta", &self.vtheta),
        ]
    }

    fn slice_time(&self, range: Range<usize>) -> Self {
        let cut = |a: &Array3<f64>| a.slice(s![range.clone(), .., ..]).to_owned();
        Self {
            u: cut(&self.u),
            theta: cut(&self.theta),
            v: cut(&self.v),
            w: cut(&self.w),
            uv: cut(&self.uv),
            uw: cut(&self.uw),
            vtheta: cut(&self.vtheta),
        }
    }
}

// ---------------------------------------------------------------------------
// ZonalMeanFluxes
// ---------------------------------------------------------------------------

/// Co-located zonal-mean inputs for one experiment.
///
/// Construction guarantees that every field has the shape
/// `[n_time, n_level, n_lat]` given by the coordinates.
#[derive(Debug, Clone)]
pub struct ZonalMeanFluxes {
    coords: Coordinates,
    fields: FluxFields,
}

impl ZonalMeanFluxes {
    /// Bundles coordinates and fields after checking their shapes agree.
    ///
    /// # Errors
    ///
    /// Returns [`TemError::ShapeMismatch`] naming the first field whose
    /// length along some axis differs from its coordinate.
    pub fn new(coords: Coordinates, fields: FluxFields) -> Result<Self, TemError> {
        for (name, field) in fields.named() {
            coords.check_shape(name, field.shape())?;
        }
        Ok(Self { coords, fields })
    }

    /// Shared coordinates.
    pub fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// The flux fields.
    pub fn fields(&self) -> &FluxFields {
        &self.fields
    }

    /// `[n_time, n_level, n_lat]`.
    pub fn shape(&self) -> [usize; 3] {
        self.coords.shape()
    }

    /// Time-index ranges of consecutive pieces of at most `chunk` steps.
    /// A `chunk` of zero, or one at least as long as the record, yields the
    /// whole record as a single range.
    pub fn time_chunk_ranges(&self, chunk: usize) -> Vec<Range<usize>> {
        let n_time = self.coords.time().len();
        if chunk == 0 || chunk >= n_time {
            return vec![0..n_time];
        }
        (0..n_time)
            .step_by(chunk)
            .map(|start| start..(start + chunk).min(n_time))
            .collect()
    }

    /// Copy of the time steps in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` extends past the time axis.
    pub fn slice_time(&self, range: Range<usize>) -> Self {
        Self {
            coords: self.coords.slice_time(range.clone()),
            fields: self.fields.slice_time(range),
        }
    }
}
