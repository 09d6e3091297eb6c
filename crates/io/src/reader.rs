//! High-level reader configuration and multi-file orchestration.

use std::path::{Path, PathBuf};

use ndarray::{Array3, Axis, concatenate};
use netcdf::AttributeValue;
use tem_diagnostics::{Coordinates, FluxFields, LevelUnits, ZonalMeanFluxes};
use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::netcdf_read::{self, AxisNames};

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Names of the seven zonal-mean flux variables in the input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluxVariableNames {
    /// Zonal-mean zonal wind.
    pub u: String,
    /// Zonal-mean potential temperature.
    pub theta: String,
    /// Zonal-mean meridional wind.
    pub v: String,
    /// Zonal-mean vertical wind (m/s).
    pub w: String,
    /// Meridional eddy momentum flux.
    pub uv: String,
    /// Vertical eddy momentum flux (m²/s²).
    pub uw: String,
    /// Meridional eddy heat flux.
    pub vtheta: String,
}

impl Default for FluxVariableNames {
    fn default() -> Self {
        Self {
            u: "Uzm".into(),
            theta: "THzm".into(),
            v: "Vzm".into(),
            w: "Wzm".into(),
            uv: "UVzm".into(),
            uw: "UWzm".into(),
            vtheta: "VTHzm".into(),
        }
    }
}

impl FluxVariableNames {
    fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.u,
            &self.theta,
            &self.v,
            &self.w,
            &self.uv,
            &self.uw,
            &self.vtheta,
        ]
        .into_iter()
        .map(String::as_str)
    }
}

/// Configuration for reading zonal-mean flux files.
///
/// The [`Default`] implementation matches the layout of CESM `TEMdiags`
/// output: level coordinate `ilev` in hPa, latitude `lat`, time `time`.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// File-name prefix of the input files.
    file_prefix: String,
    /// Time coordinate (and dimension) name.
    time_var: String,
    /// Level coordinate (and dimension) name.
    level_var: String,
    /// Latitude coordinate (and dimension) name.
    lat_var: String,
    /// Units of the level coordinate.
    level_units: LevelUnits,
    /// Flux variable names.
    variables: FluxVariableNames,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            file_prefix: "TEMdiags".into(),
            time_var: "time".into(),
            level_var: "ilev".into(),
            lat_var: "lat".into(),
            level_units: LevelUnits::Hpa,
            variables: FluxVariableNames::default(),
        }
    }
}

impl ReaderConfig {
    /// Set the file-name prefix used by [`find_input_files`].
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the time coordinate name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    /// Set the level coordinate name.
    pub fn with_level_var(mut self, name: impl Into<String>) -> Self {
        self.level_var = name.into();
        self
    }

    /// Set the latitude coordinate name.
    pub fn with_lat_var(mut self, name: impl Into<String>) -> Self {
        self.lat_var = name.into();
        self
    }

    /// Set the units of the level coordinate.
    pub fn with_level_units(mut self, units: LevelUnits) -> Self {
        self.level_units = units;
        self
    }

    /// Set the flux variable names.
    pub fn with_variables(mut self, variables: FluxVariableNames) -> Self {
        self.variables = variables;
        self
    }

    /// File-name prefix of the input files.
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Time coordinate name.
    pub fn time_var(&self) -> &str {
        &self.time_var
    }

    /// Level coordinate name.
    pub fn level_var(&self) -> &str {
        &self.level_var
    }

    /// Latitude coordinate name.
    pub fn lat_var(&self) -> &str {
        &self.lat_var
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every empty name and any
    /// coordinate name used for more than one axis.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        let named = [
            ("file_prefix", self.file_prefix.as_str()),
            ("time_var", self.time_var.as_str()),
            ("level_var", self.level_var.as_str()),
            ("lat_var", self.lat_var.as_str()),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                problems.push(format!("{field} is empty"));
            }
        }
        if self.variables.iter().any(|v| v.trim().is_empty()) {
            problems.push("flux variable names must not be empty".to_string());
        }
        if self.time_var == self.level_var
            || self.time_var == self.lat_var
            || self.level_var == self.lat_var
        {
            problems.push("time_var, level_var and lat_var must differ".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }

    fn axes(&self) -> AxisNames<'_> {
        AxisNames {
            time: &self.time_var,
            level: &self.level_var,
            lat: &self.lat_var,
        }
    }
}

// ---------------------------------------------------------------------------
// Read results
// ---------------------------------------------------------------------------

/// Metadata of the time axis carried through to the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeMetadata {
    /// CF `units` attribute of the time variable, e.g. `days since 0001-01-01`.
    pub units: Option<String>,
    /// CF `calendar` attribute of the time variable.
    pub calendar: Option<String>,
    /// Whether every time value is a time-bounds midpoint.
    pub bounds_averaged: bool,
}

/// Attributes of one coordinate variable, in file order.
pub type AttributeList = Vec<(String, AttributeValue)>;

/// Attributes of the input coordinate variables, copied into the output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateAttributes {
    pub time: AttributeList,
    pub level: AttributeList,
    pub lat: AttributeList,
}

/// Coordinate metadata the writer carries from input to output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputMetadata {
    pub time: TimeMetadata,
    pub attributes: CoordinateAttributes,
}

/// Zonal-mean fluxes of one experiment together with their coordinate metadata.
#[derive(Debug, Clone)]
pub struct FluxRecord {
    fluxes: ZonalMeanFluxes,
    metadata: OutputMetadata,
    sources: Vec<PathBuf>,
}

impl FluxRecord {
    /// The assembled fluxes.
    pub fn fluxes(&self) -> &ZonalMeanFluxes {
        &self.fluxes
    }

    /// Time-axis metadata of the first input file.
    pub fn time(&self) -> &TimeMetadata {
        &self.metadata.time
    }

    /// Time metadata plus the coordinate attributes of the first input file.
    pub fn metadata(&self) -> &OutputMetadata {
        &self.metadata
    }

    /// Files that were read, in concatenation order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Split into fluxes and output metadata.
    pub fn into_parts(self) -> (ZonalMeanFluxes, OutputMetadata) {
        (self.fluxes, self.metadata)
    }
}

/// Everything read from a single input file.
struct FilePiece {
    nominal: Vec<f64>,
    midpoints: Option<Vec<f64>>,
    level: Vec<f64>,
    lat: Vec<f64>,
    fields: [Array3<f64>; 7],
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// List the files in `dir` whose names start with `prefix` and end in `.nc`,
/// sorted by name.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `dir` does not exist and
/// [`IoError::NoInputFiles`] if nothing matches.
pub fn find_input_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    let fs_err = |e: std::io::Error| IoError::Filesystem {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(fs_err)? {
        let path = entry.map_err(fs_err)?.path();
        let matches = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".nc"));
        if matches {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(IoError::NoInputFiles {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        });
    }
    debug!(dir = %dir.display(), count = files.len(), "found input files");
    Ok(files)
}

/// Look in `path` for a time-bounds variable (`time_bnds`, then
/// `time_bounds`) and return the midpoint of each bounds pair.
///
/// Returns `Ok(None)` when neither variable exists.
///
/// # Errors
///
/// Returns [`IoError`] if the file cannot be opened or the bounds variable
/// is not shaped `(time, 2)`.
pub fn detect_time_bounds(path: &Path) -> Result<Option<Vec<f64>>, IoError> {
    let file = netcdf_read::open_file(path)?;
    netcdf_read::time_bounds_midpoints(&file, path)
}

/// Read and concatenate the flux files of `<input_dir>/<experiment>/`.
///
/// # Errors
///
/// See [`find_input_files`] and [`read_fluxes`].
pub fn read_experiment(
    input_dir: &Path,
    experiment: &str,
    config: &ReaderConfig,
) -> Result<FluxRecord, IoError> {
    config.validate()?;
    let files = find_input_files(&input_dir.join(experiment), &config.file_prefix)?;
    read_fluxes(&files, config)
}

/// Read the flux files in `paths` and concatenate them along time.
///
/// Latitude and level coordinates of every file must equal those of the
/// first. Time values are time-bounds midpoints when every file has bounds;
/// if any file lacks them, all files fall back to their nominal time values
/// so the axis is never a mix of the two.
///
/// # Errors
///
/// Returns [`IoError`] on missing files or variables, malformed layouts,
/// coordinate disagreements, or shape inconsistencies between fields.
pub fn read_fluxes(paths: &[PathBuf], config: &ReaderConfig) -> Result<FluxRecord, IoError> {
    config.validate()?;
    let Some(first_path) = paths.first() else {
        return Err(IoError::Validation {
            count: 1,
            details: "no input files given".to_string(),
        });
    };

    let (time_meta, attributes) = {
        let file = netcdf_read::open_file(first_path)?;
        let time_meta = TimeMetadata {
            units: netcdf_read::string_attribute(&file, &config.time_var, "units"),
            calendar: netcdf_read::string_attribute(&file, &config.time_var, "calendar"),
            bounds_averaged: false,
        };
        let attributes = CoordinateAttributes {
            time: netcdf_read::variable_attributes(&file, &config.time_var),
            level: netcdf_read::variable_attributes(&file, &config.level_var),
            lat: netcdf_read::variable_attributes(&file, &config.lat_var),
        };
        (time_meta, attributes)
    };

    let mut pieces = Vec::with_capacity(paths.len());
    for path in paths {
        let piece = read_piece(path, config)?;
        if let Some(first) = pieces.first() {
            check_same_coordinate(&config.level_var, &first.level, &piece.level, path)?;
            check_same_coordinate(&config.lat_var, &first.lat, &piece.lat, path)?;
        }
        pieces.push(piece);
    }

    let with_bounds = pieces.iter().filter(|p| p.midpoints.is_some()).count();
    let bounds_averaged = with_bounds == pieces.len();
    if with_bounds > 0 && !bounds_averaged {
        warn!(
            with_bounds,
            files = pieces.len(),
            "time bounds present in only some files; using nominal time values for all"
        );
    }
    let time: Vec<f64> = pieces
        .iter()
        .flat_map(|p| match &p.midpoints {
            Some(mid) if bounds_averaged => mid.iter().copied(),
            _ => p.nominal.iter().copied(),
        })
        .collect();
    let field = |idx: usize| -> Result<Array3<f64>, IoError> {
        let views: Vec<_> = pieces.iter().map(|p| p.fields[idx].view()).collect();
        concatenate(Axis(0), &views).map_err(|e| IoError::Validation {
            count: 1,
            details: format!("concatenating along time: {e}"),
        })
    };
    let fields = FluxFields {
        u: field(0)?,
        theta: field(1)?,
        v: field(2)?,
        w: field(3)?,
        uv: field(4)?,
        uw: field(5)?,
        vtheta: field(6)?,
    };

    let first = &pieces[0];
    let coords = Coordinates::new(
        time,
        first.level.clone(),
        config.level_units,
        first.lat.clone(),
    );
    let fluxes = ZonalMeanFluxes::new(coords, fields)?;
    let [n_time, n_level, n_lat] = fluxes.shape();
    info!(
        files = paths.len(),
        n_time, n_level, n_lat, bounds_averaged, "read zonal-mean fluxes"
    );

    Ok(FluxRecord {
        fluxes,
        metadata: OutputMetadata {
            time: TimeMetadata {
                bounds_averaged,
                ..time_meta
            },
            attributes,
        },
        sources: paths.to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_piece(path: &Path, config: &ReaderConfig) -> Result<FilePiece, IoError> {
    let file = netcdf_read::open_file(path)?;
    let axes = config.axes();

    let level = netcdf_read::read_1d_f64(&file, &config.level_var, path)?;
    let lat = netcdf_read::read_1d_f64(&file, &config.lat_var, path)?;
    let nominal = netcdf_read::read_1d_f64(&file, &config.time_var, path)?;

    let midpoints = match netcdf_read::time_bounds_midpoints(&file, path)? {
        Some(mid) if mid.len() == nominal.len() => Some(mid),
        Some(mid) => {
            return Err(IoError::DimensionMismatch {
                name: format!("time bounds in {}", path.display()),
                expected: nominal.len(),
                got: mid.len(),
            });
        }
        None => {
            warn!(
                file = %path.display(),
                "no time_bnds or time_bounds variable"
            );
            None
        }
    };

    let v = &config.variables;
    let fields = [
        netcdf_read::read_field(&file, &v.u, axes, path)?,
        netcdf_read::read_field(&file, &v.theta, axes, path)?,
        netcdf_read::read_field(&file, &v.v, axes, path)?,
        netcdf_read::read_field(&file, &v.w, axes, path)?,
        netcdf_read::read_field(&file, &v.uv, axes, path)?,
        netcdf_read::read_field(&file, &v.uw, axes, path)?,
        netcdf_read::read_field(&file, &v.vtheta, axes, path)?,
    ];
    debug!(file = %path.display(), n_time = nominal.len(), "read flux file");

    Ok(FilePiece {
        nominal,
        midpoints,
        level,
        lat,
        fields,
    })
}

fn check_same_coordinate(
    name: &str,
    first: &[f64],
    other: &[f64],
    path: &Path,
) -> Result<(), IoError> {
    if first == other {
        Ok(())
    } else {
        Err(IoError::CoordinateMismatch {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ReaderConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.file_prefix(), "TEMdiags");
        assert_eq!(cfg.level_var(), "ilev");
        assert_eq!(cfg.lat_var(), "lat");
        assert_eq!(cfg.time_var(), "time");
    }

    #[test]
    fn empty_names_are_all_reported() {
        let cfg = ReaderConfig::default()
            .with_file_prefix("")
            .with_level_var(" ");
        match cfg.validate() {
            Err(IoError::Validation { count, details }) => {
                assert_eq!(count, 2);
                assert!(details.contains("file_prefix"));
                assert!(details.contains("level_var"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_axis_names_rejected() {
        let cfg = ReaderConfig::default().with_lat_var("ilev");
        assert!(matches!(cfg.validate(), Err(IoError::Validation { count: 1, .. })));
    }

    #[test]
    fn empty_variable_name_rejected() {
        let vars = FluxVariableNames {
            vtheta: String::new(),
            ..FluxVariableNames::default()
        };
        let cfg = ReaderConfig::default().with_variables(vars);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn read_fluxes_requires_paths() {
        let err = read_fluxes(&[], &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::Validation { .. }));
    }

    #[test]
    fn coordinate_check() {
        let p = Path::new("/data/x.nc");
        assert!(check_same_coordinate("lat", &[1.0, 2.0], &[1.0, 2.0], p).is_ok());
        assert!(matches!(
            check_same_coordinate("lat", &[1.0, 2.0], &[1.0, 2.5], p),
            Err(IoError::CoordinateMismatch { .. })
        ));
    }

    #[test]
    fn missing_directory_is_not_found() {
        let err = find_input_files(Path::new("/nonexistent/tem/dir"), "TEMdiags").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
