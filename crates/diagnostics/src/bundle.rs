//! Named, metadata-tagged outputs handed to the writer.

use ndarray::{Array3, ArrayView3, concatenate};

use crate::error::TemError;
use crate::fields::{Coordinates, TIME_AXIS};
use crate::tem::TemFields;

// ---------------------------------------------------------------------------
// DiagnosticKind
// ---------------------------------------------------------------------------

/// The nine output quantities, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Zonal-mean zonal wind, passed through from the input.
    Uzm,
    /// Northward E-P flux.
    Epfy,
    /// Upward E-P flux.
    Epfz,
    /// Residual northward wind.
    Vtem,
    /// Residual upward wind.
    Wtem,
    /// TEM mass stream function.
    Psitem,
    /// Tendency from E-P flux divergence.
    Utendepfd,
    /// Tendency from residual northward advection and Coriolis.
    Utendvtem,
    /// Tendency from residual upward advection.
    Utendwtem,
}

impl DiagnosticKind {
    /// All kinds in output order.
    pub const ALL: [DiagnosticKind; 9] = [
        Self::Uzm,
        Self::Epfy,
        Self::Epfz,
        Self::Vtem,
        Self::Wtem,
        Self::Psitem,
        Self::Utendepfd,
        Self::Utendvtem,
        Self::Utendwtem,
    ];

    /// Variable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Uzm => "uzm",
            Self::Epfy => "epfy",
            Self::Epfz => "epfz",
            Self::Vtem => "vtem",
            Self::Wtem => "wtem",
            Self::Psitem => "psitem",
            Self::Utendepfd => "utendepfd",
            Self::Utendvtem => "utendvtem",
            Self::Utendwtem => "utendwtem",
        }
    }

    /// CF `long_name`.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::Uzm => "zonal mean zonal wind",
            Self::Epfy => "northward component of E-P flux",
            Self::Epfz => "upward component of E-P flux",
            Self::Vtem => "Transformed Eulerian mean northward wind",
            Self::Wtem => "Transformed Eulerian mean upward wind",
            Self::Psitem => "Transformed Eulerian mean mass stream function",
            Self::Utendepfd => "tendency of eastward wind due to Eliassen-Palm flux divergence",
            Self::Utendvtem => {
                "tendency of eastward wind due to TEM northward wind advection and the coriolis term"
            }
            Self::Utendwtem => "tendency of eastward wind due to TEM upward wind advection",
        }
    }

    /// CF `units`.
    pub fn units(self) -> &'static str {
        match self {
            Self::Uzm | Self::Vtem | Self::Wtem => "m/s",
            Self::Epfy => "m3/s2",
            Self::Epfz => "m2/s2",
            Self::Psitem => "kg/s",
            Self::Utendepfd | Self::Utendvtem | Self::Utendwtem => "m/s2",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// DiagnosticField
// ---------------------------------------------------------------------------

/// One output quantity with its metadata. Read-only once built.
#[derive(Debug, Clone)]
pub struct DiagnosticField {
    kind: DiagnosticKind,
    data: Array3<f64>,
}

impl DiagnosticField {
    /// Which quantity this is.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Variable name.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// CF `long_name`.
    pub fn long_name(&self) -> &'static str {
        self.kind.long_name()
    }

    /// CF `units`.
    pub fn units(&self) -> &'static str {
        self.kind.units()
    }

    /// Values on the `(time, level, lat)` grid.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// DiagnosticBundle
// ---------------------------------------------------------------------------

/// The complete diagnostic set of one experiment, sharing the coordinates
/// of the input zonal wind.
#[derive(Debug, Clone)]
pub struct DiagnosticBundle {
    coords: Coordinates,
    fields: Vec<DiagnosticField>,
}

impl DiagnosticBundle {
    pub(crate) fn new(coords: Coordinates, uzm: Array3<f64>, tem: TemFields) -> Self {
        let data = [
            uzm,
            tem.epfy,
            tem.epfz,
            tem.vtem,
            tem.wtem,
            tem.psitem,
            tem.utendepfd,
            tem.utendvtem,
            tem.utendwtem,
        ];
        let fields = DiagnosticKind::ALL
            .into_iter()
            .zip(data)
            .map(|(kind, data)| DiagnosticField { kind, data })
            .collect();
        Self { coords, fields }
    }

    /// Coordinates of every field.
    pub fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// All fields in output order.
    pub fn fields(&self) -> &[DiagnosticField] {
        &self.fields
    }

    /// The field of a given kind.
    pub fn get(&self, kind: DiagnosticKind) -> &DiagnosticField {
        &self.fields[kind.index()]
    }

    /// Joins bundles computed on consecutive time chunks.
    ///
    /// # Errors
    ///
    /// Returns [`TemError::Concatenate`] if `bundles` is empty or the bundles
    /// disagree on the level or latitude coordinates.
    pub fn concat_time(bundles: Vec<DiagnosticBundle>) -> Result<Self, TemError> {
        let mut iter = bundles.into_iter();
        let Some(first) = iter.next() else {
            return Err(TemError::Concatenate {
                reason: "no bundles".to_string(),
            });
        };
        let rest: Vec<DiagnosticBundle> = iter.collect();
        if rest.is_empty() {
            return Ok(first);
        }

        let mut time = first.coords.time().to_vec();
        for (i, b) in rest.iter().enumerate() {
            if b.coords.level() != first.coords.level()
                || b.coords.level_units() != first.coords.level_units()
                || b.coords.lat() != first.coords.lat()
            {
                return Err(TemError::Concatenate {
                    reason: format!("bundle {} has different level or latitude coordinates", i + 1),
                });
            }
            time.extend_from_slice(b.coords.time());
        }

        let mut fields = Vec::with_capacity(first.fields.len());
        for kind in DiagnosticKind::ALL {
            let views: Vec<ArrayView3<'_, f64>> = std::iter::once(&first)
                .chain(rest.iter())
                .map(|b| b.get(kind).data.view())
                .collect();
            let data = concatenate(TIME_AXIS, &views).map_err(|e| TemError::Concatenate {
                reason: format!("{}: {e}", kind.name()),
            })?;
            fields.push(DiagnosticField { kind, data });
        }

        let coords = Coordinates::new(
            time,
            first.coords.level().to_vec(),
            first.coords.level_units(),
            first.coords.lat().to_vec(),
        );
        Ok(Self { coords, fields })
    }
}
