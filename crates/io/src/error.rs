//! Error types for tem-io.

use std::path::PathBuf;

use tem_diagnostics::TemError;

/// Error type for all fallible operations in the tem-io crate.
///
/// Covers filesystem and netCDF failures, missing or malformed variables,
/// and disagreements between the files that make up one experiment.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file or directory does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when an input directory holds no matching flux files.
    #[error("no files matching '{prefix}*.nc' in {}", dir.display())]
    NoInputFiles {
        /// Directory that was searched.
        dir: PathBuf,
        /// File-name prefix that was searched for.
        prefix: String,
    },

    /// Wraps an error originating from the netCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying netCDF failure.
        reason: String,
    },

    /// Wraps a filesystem failure while listing, renaming or removing files.
    #[error("filesystem error on {}: {reason}", path.display())]
    Filesystem {
        /// Path being operated on.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a variable has an unexpected layout or size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the variable or dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a file's coordinate differs from the first file's.
    #[error("coordinate '{name}' in {} differs from the first input file", path.display())]
    CoordinateMismatch {
        /// Name of the coordinate variable.
        name: String,
        /// Path to the offending file.
        path: PathBuf,
    },

    /// Wraps an error from assembling the flux record.
    #[error("diagnostics error: {reason}")]
    Diagnostics {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<TemError> for IoError {
    fn from(e: TemError) -> Self {
        IoError::Diagnostics {
            reason: e.to_string(),
        }
    }
}
