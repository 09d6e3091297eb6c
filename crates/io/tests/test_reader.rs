//! Integration tests for reading zonal-mean flux files.

mod common;

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use common::FixtureBuilder;
use netcdf::AttributeValue;
use tem_diagnostics::LevelUnits;
use tem_io::{
    IoError, ReaderConfig, detect_time_bounds, find_input_files, read_experiment, read_fluxes,
};
use tempfile::tempdir;

#[test]
fn reads_single_file_into_time_level_lat_order() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0, 59.0])
        .with_bounds("time_bnds")
        .write(&dir.path().join("TEMdiags.0001.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    let fluxes = record.fluxes();
    assert_eq!(fluxes.shape(), [2, 4, 4]);
    assert_eq!(fluxes.coords().level(), &[10.0, 100.0, 500.0, 1000.0]);
    assert_eq!(fluxes.coords().level_units(), LevelUnits::Hpa);

    let fx = FixtureBuilder::new(vec![]);
    let expected = FixtureBuilder::value(0, 59.0, 2, 3, &fx.ilev, &fx.lat);
    assert_eq!(fluxes.fields().u[[1, 2, 3]], expected);
    let expected = FixtureBuilder::value(6, 31.0, 3, 0, &fx.ilev, &fx.lat);
    assert_eq!(fluxes.fields().vtheta[[0, 3, 0]], expected);
}

#[test]
fn time_bounds_midpoints_replace_nominal_time() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0, 59.0])
        .with_bounds("time_bnds")
        .write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    assert_eq!(record.fluxes().coords().time(), &[30.5, 58.5]);
    assert!(record.time().bounds_averaged);
    assert_eq!(record.time().calendar.as_deref(), Some("noleap"));
    assert_eq!(
        record.time().units.as_deref(),
        Some("days since 0001-01-01 00:00:00")
    );
}

#[test]
fn time_bounds_alternative_name_is_found() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![10.0, 20.0, 30.0])
        .with_bounds("time_bounds")
        .write(&dir.path().join("TEMdiags.nc"));

    assert_eq!(
        detect_time_bounds(&path).unwrap(),
        Some(vec![9.5, 19.5, 29.5])
    );
}

#[test]
fn missing_time_bounds_fall_back_to_nominal_time() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0, 59.0]).write(&dir.path().join("TEMdiags.nc"));

    assert_eq!(detect_time_bounds(&path).unwrap(), None);
    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    assert_eq!(record.fluxes().coords().time(), &[31.0, 59.0]);
    assert!(!record.time().bounds_averaged);
}

#[test]
fn multiple_files_concatenate_along_time_in_name_order() {
    let dir = tempdir().unwrap();
    let exp = dir.path().join("L70_bugfix");
    fs::create_dir(&exp).unwrap();
    FixtureBuilder::new(vec![3.0]).write(&exp.join("TEMdiags.0002.nc"));
    FixtureBuilder::new(vec![1.0, 2.0]).write(&exp.join("TEMdiags.0001.nc"));
    FixtureBuilder::new(vec![99.0]).write(&exp.join("other.0001.nc"));
    fs::write(exp.join("TEMdiags.txt"), "not netcdf").unwrap();

    let record = read_experiment(dir.path(), "L70_bugfix", &ReaderConfig::default()).unwrap();
    assert_eq!(record.sources().len(), 2);
    assert_eq!(record.fluxes().coords().time(), &[1.0, 2.0, 3.0]);
    assert_eq!(record.fluxes().shape(), [3, 4, 4]);

    let fx = FixtureBuilder::new(vec![]);
    let expected = FixtureBuilder::value(0, 3.0, 1, 1, &fx.ilev, &fx.lat);
    assert_eq!(record.fluxes().fields().u[[2, 1, 1]], expected);
}

#[test]
fn partial_time_bounds_fall_back_to_nominal_time_for_all_files() {
    let dir = tempdir().unwrap();
    let first = FixtureBuilder::new(vec![31.0, 59.0])
        .with_bounds("time_bnds")
        .write(&dir.path().join("TEMdiags.0001.nc"));
    let second = FixtureBuilder::new(vec![90.0]).write(&dir.path().join("TEMdiags.0002.nc"));

    let record = read_fluxes(&[first, second], &ReaderConfig::default()).unwrap();
    assert_eq!(record.fluxes().coords().time(), &[31.0, 59.0, 90.0]);
    assert!(!record.time().bounds_averaged);
}

#[test]
fn fill_value_cells_read_as_nan() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0, 59.0])
        .with_fill_value(1e36, [0, 2, 2])
        .write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    let u = &record.fluxes().fields().u;
    assert!(u[[0, 2, 2]].is_nan());
    assert_eq!(u.iter().filter(|x| x.is_nan()).count(), 1);

    let fx = FixtureBuilder::new(vec![]);
    let expected = FixtureBuilder::value(0, 59.0, 2, 2, &fx.ilev, &fx.lat);
    assert_eq!(u[[1, 2, 2]], expected);
}

#[test]
fn missing_value_cells_read_as_nan() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0])
        .with_missing_value(-999.0, [0, 1, 3])
        .write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    assert!(record.fluxes().fields().u[[0, 1, 3]].is_nan());
    assert!(!record.fluxes().fields().u[[0, 1, 2]].is_nan());
}

#[test]
fn packed_fluxes_are_unpacked() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0, 59.0])
        .with_packing(0.5, 100.0)
        .write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    let fields = record.fluxes().fields();
    let fx = FixtureBuilder::new(vec![]);
    assert_relative_eq!(
        fields.u[[1, 3, 0]],
        FixtureBuilder::value(0, 59.0, 3, 0, &fx.ilev, &fx.lat),
        max_relative = 1e-12
    );
    assert_relative_eq!(
        fields.vtheta[[0, 2, 1]],
        FixtureBuilder::value(6, 31.0, 2, 1, &fx.ilev, &fx.lat),
        max_relative = 1e-12
    );
}

#[test]
fn coordinate_attributes_of_first_file_are_kept() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![31.0]).write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    let attrs = &record.metadata().attributes;
    let lookup = |list: &[(String, AttributeValue)], key: &str| {
        list.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(
        lookup(&attrs.level, "positive"),
        Some(AttributeValue::Str("down".into()))
    );
    assert_eq!(
        lookup(&attrs.lat, "long_name"),
        Some(AttributeValue::Str("latitude".into()))
    );
    assert_eq!(
        lookup(&attrs.time, "calendar"),
        Some(AttributeValue::Str("noleap".into()))
    );
}

#[test]
fn find_input_files_filters_and_sorts() {
    let dir = tempdir().unwrap();
    for name in ["TEMdiags.b.nc", "TEMdiags.a.nc", "TEMdiags.a.nc4", "x_TEMdiags.nc"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    let files = find_input_files(dir.path(), "TEMdiags").unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["TEMdiags.a.nc", "TEMdiags.b.nc"]);
}

#[test]
fn empty_experiment_directory_is_an_error() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    let err = read_experiment(dir.path(), "empty", &ReaderConfig::default()).unwrap_err();
    assert!(
        matches!(err, IoError::NoInputFiles { .. }),
        "expected NoInputFiles, got {err:?}"
    );
}

#[test]
fn differing_latitudes_are_rejected() {
    let dir = tempdir().unwrap();
    let a = FixtureBuilder::new(vec![1.0]).write(&dir.path().join("TEMdiags.1.nc"));
    let b = FixtureBuilder::new(vec![2.0])
        .with_lat(vec![-60.0, -20.0, 20.0, 61.0])
        .write(&dir.path().join("TEMdiags.2.nc"));

    let err = read_fluxes(&[a, b], &ReaderConfig::default()).unwrap_err();
    match err {
        IoError::CoordinateMismatch { name, .. } => assert_eq!(name, "lat"),
        other => panic!("expected CoordinateMismatch, got {other:?}"),
    }
}

#[test]
fn missing_flux_variable_is_reported_by_name() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![1.0])
        .without("VTHzm")
        .write(&dir.path().join("TEMdiags.nc"));

    match read_fluxes(&[path], &ReaderConfig::default()).unwrap_err() {
        IoError::MissingVariable { name, .. } => assert_eq!(name, "VTHzm"),
        other => panic!("expected MissingVariable, got {other:?}"),
    }
}

#[test]
fn singleton_longitude_is_squeezed() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(vec![1.0, 2.0])
        .with_trailing_lon()
        .write(&dir.path().join("TEMdiags.nc"));

    let record = read_fluxes(&[path], &ReaderConfig::default()).unwrap();
    assert_eq!(record.fluxes().shape(), [2, 4, 4]);
}

#[test]
fn missing_file_is_not_found() {
    let path = Path::new("/tmp/tem_test_nonexistent_file.nc").to_path_buf();
    let err = read_fluxes(&[path], &ReaderConfig::default()).unwrap_err();
    assert!(
        matches!(err, IoError::FileNotFound { .. }),
        "expected FileNotFound, got {err:?}"
    );
}

#[test]
fn invalid_config_rejects_before_opening() {
    let path = Path::new("/tmp/tem_test_nonexistent_file.nc").to_path_buf();
    let config = ReaderConfig::default().with_level_var("");
    let err = read_fluxes(&[path], &config).unwrap_err();
    assert!(
        matches!(err, IoError::Validation { .. }),
        "expected Validation, got {err:?}"
    );
}
