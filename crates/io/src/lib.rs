//! # tem-io
//!
//! Read zonal-mean flux files from netCDF and write TEM diagnostics back
//! to netCDF. Bridges the on-disk layout of model output into
//! [`tem_diagnostics::ZonalMeanFluxes`] and out of
//! [`tem_diagnostics::DiagnosticBundle`].

mod error;
mod netcdf_read;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::{
    AttributeList, CoordinateAttributes, FluxRecord, FluxVariableNames, OutputMetadata,
    ReaderConfig, TimeMetadata, detect_time_bounds, find_input_files, read_experiment,
    read_fluxes,
};
pub use writer::{WriterConfig, partial_path, write_bundle};
