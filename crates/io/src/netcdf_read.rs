//! Low-level netCDF extraction helpers.

use std::path::Path;

use ndarray::Array3;
use netcdf::AttributeValue;

use crate::error::IoError;

/// Names of the dimensions that make up the `(time, level, lat)` layout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisNames<'a> {
    pub time: &'a str,
    pub level: &'a str,
    pub lat: &'a str,
}

impl AxisNames<'_> {
    fn position(&self, dim: &str) -> Option<usize> {
        if dim == self.time {
            Some(0)
        } else if dim == self.level {
            Some(1)
        } else if dim == self.lat {
            Some(2)
        } else {
            None
        }
    }
}

/// Open a netCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Read a 1-D `f64` variable, unpacked as described by [`Packing`].
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = file
        .variable(name)
        .ok_or_else(|| IoError::MissingVariable {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    let raw = var.get_values::<f64, _>(..)?;
    Ok(Packing::of(&var).unpack(raw))
}

/// Read a zonal-mean field into a `(time, level, lat)` array, unpacked as
/// described by [`Packing`].
///
/// The three named dimensions must appear in that order. Any other
/// dimension must have length one and is squeezed out, so a field stored as
/// `(time, level, lat, lon=1)` reads the same as a 3-D one.
pub(crate) fn read_field(
    file: &netcdf::File,
    name: &str,
    axes: AxisNames<'_>,
    path: &Path,
) -> Result<Array3<f64>, IoError> {
    let var = file
        .variable(name)
        .ok_or_else(|| IoError::MissingVariable {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut shape = [0usize; 3];
    let mut found = 0usize;
    for dim in var.dimensions() {
        let dim_name = dim.name();
        match axes.position(&dim_name) {
            Some(axis) if axis == found => {
                shape[axis] = dim.len();
                found += 1;
            }
            Some(axis) => {
                return Err(IoError::DimensionMismatch {
                    name: format!("{name} axis order ({dim_name})"),
                    expected: found,
                    got: axis,
                });
            }
            None if dim.len() == 1 => {}
            None => {
                return Err(IoError::DimensionMismatch {
                    name: format!("{name}:{dim_name}"),
                    expected: 1,
                    got: dim.len(),
                });
            }
        }
    }
    if found != 3 {
        return Err(IoError::DimensionMismatch {
            name: format!("{name} dimensions"),
            expected: 3,
            got: found,
        });
    }

    let data = Packing::of(&var).unpack(var.get_values::<f64, _>(..)?);
    Array3::from_shape_vec(shape, data).map_err(|e| IoError::Validation {
        count: 1,
        details: format!("{name}: {e}"),
    })
}

/// CF masking and packing of a variable.
///
/// Raw values equal to `_FillValue` or any `missing_value` become NaN; the
/// rest are mapped to `raw * scale_factor + add_offset`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Packing {
    missing: Vec<f64>,
    scale: f64,
    offset: f64,
}

impl Packing {
    pub(crate) fn of(var: &netcdf::Variable<'_>) -> Self {
        let mut missing = numeric_attribute(var, "_FillValue");
        missing.extend(numeric_attribute(var, "missing_value"));
        Self {
            missing,
            scale: numeric_attribute(var, "scale_factor")
                .first()
                .copied()
                .unwrap_or(1.0),
            offset: numeric_attribute(var, "add_offset")
                .first()
                .copied()
                .unwrap_or(0.0),
        }
    }

    fn is_identity(&self) -> bool {
        self.missing.is_empty() && self.scale == 1.0 && self.offset == 0.0
    }

    pub(crate) fn unpack(&self, raw: Vec<f64>) -> Vec<f64> {
        if self.is_identity() {
            return raw;
        }
        raw.into_iter()
            .map(|v| {
                if self.missing.contains(&v) {
                    f64::NAN
                } else {
                    v * self.scale + self.offset
                }
            })
            .collect()
    }
}

/// All values of a numeric attribute, widened to `f64`. Empty when the
/// attribute is absent or textual.
fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Vec<f64> {
    let Some(Ok(value)) = var.attribute_value(name) else {
        return Vec::new();
    };
    match value {
        AttributeValue::Double(v) => vec![v],
        AttributeValue::Float(v) => vec![f64::from(v)],
        AttributeValue::Longlong(v) => vec![v as f64],
        AttributeValue::Ulonglong(v) => vec![v as f64],
        AttributeValue::Int(v) => vec![f64::from(v)],
        AttributeValue::Uint(v) => vec![f64::from(v)],
        AttributeValue::Short(v) => vec![f64::from(v)],
        AttributeValue::Ushort(v) => vec![f64::from(v)],
        AttributeValue::Schar(v) => vec![f64::from(v)],
        AttributeValue::Uchar(v) => vec![f64::from(v)],
        AttributeValue::Doubles(v) => v,
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        _ => Vec::new(),
    }
}

/// Every readable attribute of variable `name`, in file order. Empty when
/// the variable is absent.
pub(crate) fn variable_attributes(
    file: &netcdf::File,
    name: &str,
) -> Vec<(String, AttributeValue)> {
    let Some(var) = file.variable(name) else {
        return Vec::new();
    };
    var.attributes()
        .filter_map(|attr| attr.value().ok().map(|v| (attr.name().to_string(), v)))
        .collect()
}

/// Read a string attribute of a variable, if present and textual.
pub(crate) fn string_attribute(file: &netcdf::File, var: &str, attr: &str) -> Option<String> {
    file.variable(var)?
        .attribute_value(attr)
        .and_then(|res| res.ok())
        .and_then(|av| match av {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}

/// Variables that may carry the averaging interval of each time step.
pub(crate) const TIME_BOUNDS_VARS: [&str; 2] = ["time_bnds", "time_bounds"];

/// Midpoints of the first time-bounds variable present in `file`.
///
/// Returns `Ok(None)` when the file has none of [`TIME_BOUNDS_VARS`].
pub(crate) fn time_bounds_midpoints(
    file: &netcdf::File,
    path: &Path,
) -> Result<Option<Vec<f64>>, IoError> {
    let Some((name, var)) = TIME_BOUNDS_VARS
        .iter()
        .find_map(|&name| file.variable(name).map(|v| (name, v)))
    else {
        return Ok(None);
    };

    let dims = var.dimensions();
    let width = dims.last().map(|d| d.len()).unwrap_or(0);
    if dims.len() != 2 || width != 2 {
        return Err(IoError::DimensionMismatch {
            name: format!("{name} in {}", path.display()),
            expected: 2,
            got: width,
        });
    }

    let bounds = var.get_values::<f64, _>(..)?;
    Ok(Some(
        bounds
            .chunks_exact(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect(),
    ))
}
