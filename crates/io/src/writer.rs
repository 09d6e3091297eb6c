//! netCDF writer for diagnostic bundles.

use std::path::{Path, PathBuf};

use netcdf::AttributeValue;
use tem_diagnostics::{DiagnosticBundle, DiagnosticField};
use tracing::{debug, info, warn};

use crate::error::IoError;
use crate::reader::{AttributeList, OutputMetadata};

/// Input attributes that describe the on-disk encoding or companion
/// variables of the input, not the values written here.
const ENCODING_ATTRIBUTES: [&str; 5] = [
    "_FillValue",
    "missing_value",
    "scale_factor",
    "add_offset",
    "bounds",
];

/// Names of the coordinate variables in the output file.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Time coordinate (and dimension) name.
    time_var: String,
    /// Level coordinate (and dimension) name.
    level_var: String,
    /// Latitude coordinate (and dimension) name.
    lat_var: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            time_var: "time".into(),
            level_var: "ilev".into(),
            lat_var: "lat".into(),
        }
    }
}

impl WriterConfig {
    /// Sets the time coordinate name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    /// Sets the level coordinate name.
    pub fn with_level_var(mut self, name: impl Into<String>) -> Self {
        self.level_var = name.into();
        self
    }

    /// Sets the latitude coordinate name.
    pub fn with_lat_var(mut self, name: impl Into<String>) -> Self {
        self.lat_var = name.into();
        self
    }

    fn dims(&self) -> [&str; 3] {
        [&self.time_var, &self.level_var, &self.lat_var]
    }

    fn validate(&self) -> Result<(), IoError> {
        let [t, l, y] = self.dims();
        if t.is_empty() || l.is_empty() || y.is_empty() || t == l || t == y || l == y {
            return Err(IoError::Validation {
                count: 1,
                details: format!("output coordinate names must be distinct and non-empty, got {t:?}, {l:?}, {y:?}"),
            });
        }
        Ok(())
    }
}

/// Path of the in-progress sibling of `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `bundle` to `path` as netCDF.
///
/// The coordinates are written first, carrying the input coordinate
/// attributes in `metadata`, and each diagnostic is then appended in turn. Everything goes to a `.partial` sibling that is renamed to
/// `path` once all fields are in place; on failure the partial file is
/// removed and `path` is left untouched.
///
/// # Errors
///
/// Returns [`IoError`] if the configuration is invalid or any netCDF or
/// filesystem operation fails.
pub fn write_bundle(
    path: &Path,
    bundle: &DiagnosticBundle,
    metadata: &OutputMetadata,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::Filesystem {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    let partial = partial_path(path);
    let written = write_coordinates(&partial, bundle, metadata, config).and_then(|()| {
        bundle
            .fields()
            .iter()
            .try_for_each(|field| append_field(&partial, field, config))
    });

    if let Err(e) = written {
        if partial.exists()
            && let Err(rm) = std::fs::remove_file(&partial)
        {
            warn!(file = %partial.display(), error = %rm, "could not remove partial output");
        }
        return Err(e);
    }

    std::fs::rename(&partial, path).map_err(|e| IoError::Filesystem {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!(
        file = %path.display(),
        fields = bundle.fields().len(),
        "wrote TEM diagnostics"
    );
    Ok(())
}

fn write_coordinates(
    path: &Path,
    bundle: &DiagnosticBundle,
    metadata: &OutputMetadata,
    config: &WriterConfig,
) -> Result<(), IoError> {
    let coords = bundle.coords();
    let [n_time, n_level, n_lat] = coords.shape();
    let mut file = netcdf::create(path)?;

    file.add_dimension(&config.time_var, n_time)?;
    file.add_dimension(&config.level_var, n_level)?;
    file.add_dimension(&config.lat_var, n_lat)?;

    let time = &metadata.time;
    let mut time_fixed = Vec::new();
    if let Some(units) = &time.units {
        time_fixed.push(("units", AttributeValue::from(units.as_str())));
    }
    if let Some(calendar) = &time.calendar {
        time_fixed.push(("calendar", AttributeValue::from(calendar.as_str())));
    }
    if time.bounds_averaged {
        time_fixed.push(("comment", AttributeValue::from("midpoint of time bounds")));
    }

    let inherited = &metadata.attributes;
    let coordinates = [
        (
            config.time_var.as_str(),
            coords.time(),
            merge_attributes(&inherited.time, &time_fixed, &[]),
        ),
        (
            config.level_var.as_str(),
            coords.level(),
            merge_attributes(
                &inherited.level,
                &[("units", AttributeValue::from(coords.level_units().as_str()))],
                &[],
            ),
        ),
        (
            config.lat_var.as_str(),
            coords.lat(),
            merge_attributes(
                &inherited.lat,
                &[],
                &[("units", AttributeValue::from("degrees_north"))],
            ),
        ),
    ];
    for (name, values, attributes) in coordinates {
        let mut var = file.add_variable::<f64>(name, &[name])?;
        for (key, value) in attributes {
            var.put_attribute(&key, value)?;
        }
        var.put_values(values, ..)?;
    }
    debug!(file = %path.display(), n_time, n_level, n_lat, "wrote coordinates");
    Ok(())
}

/// Attributes for an output coordinate: the `inherited` ones minus
/// [`ENCODING_ATTRIBUTES`], with `fixed` replacing any same-named entry and
/// `defaults` added only where the key is still absent.
fn merge_attributes(
    inherited: &AttributeList,
    fixed: &[(&str, AttributeValue)],
    defaults: &[(&str, AttributeValue)],
) -> AttributeList {
    let mut merged: AttributeList = inherited
        .iter()
        .filter(|(key, _)| !ENCODING_ATTRIBUTES.contains(&key.as_str()))
        .cloned()
        .collect();
    for (key, value) in fixed {
        match merged.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.clone(),
            None => merged.push(((*key).to_string(), value.clone())),
        }
    }
    for (key, value) in defaults {
        if !merged.iter().any(|(k, _)| k == key) {
            merged.push(((*key).to_string(), value.clone()));
        }
    }
    merged
}

fn append_field(path: &Path, field: &DiagnosticField, config: &WriterConfig) -> Result<(), IoError> {
    let mut file = netcdf::append(path)?;
    let values: Vec<f64> = field.data().iter().copied().collect();
    let mut var = file.add_variable::<f64>(field.name(), &config.dims())?;
    var.put_values(&values, ..)?;
    var.put_attribute("long_name", field.long_name())?;
    var.put_attribute("units", field.units())?;
    debug!(field = field.name(), "appended diagnostic");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/out/L70_bugfix.nc")),
            PathBuf::from("/out/L70_bugfix.nc.partial")
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert!(WriterConfig::default().validate().is_ok());
    }

    fn text(s: &str) -> AttributeValue {
        AttributeValue::from(s)
    }

    #[test]
    fn merge_keeps_descriptive_attributes_and_drops_encoding() {
        let inherited = vec![
            ("long_name".to_string(), text("latitude")),
            ("_FillValue".to_string(), AttributeValue::Double(1e36)),
            ("bounds".to_string(), text("lat_bnds")),
        ];
        let merged = merge_attributes(&inherited, &[], &[("units", text("degrees_north"))]);
        assert_eq!(
            merged,
            vec![
                ("long_name".to_string(), text("latitude")),
                ("units".to_string(), text("degrees_north")),
            ]
        );
    }

    #[test]
    fn fixed_attributes_replace_inherited_and_defaults_do_not() {
        let inherited = vec![
            ("units".to_string(), text("Pa")),
            ("positive".to_string(), text("down")),
        ];
        let merged = merge_attributes(
            &inherited,
            &[("units", text("hPa"))],
            &[("positive", text("up"))],
        );
        assert_eq!(
            merged,
            vec![
                ("units".to_string(), text("hPa")),
                ("positive".to_string(), text("down")),
            ]
        );
    }

    #[test]
    fn clashing_names_rejected() {
        let cfg = WriterConfig::default().with_level_var("lat");
        assert!(matches!(cfg.validate(), Err(IoError::Validation { .. })));
    }
}
