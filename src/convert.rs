//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use tem_diagnostics::{LevelUnits, PhysicalConstants};
use tem_io::{FluxVariableNames, ReaderConfig, WriterConfig};

use crate::config::{ConstantsToml, IoToml, VariablesToml};

/// Parses a level-units name into the corresponding enum variant.
pub fn parse_level_units(s: &str) -> Result<LevelUnits> {
    match s.to_lowercase().as_str() {
        "pa" => Ok(LevelUnits::Pa),
        "hpa" | "mb" | "mbar" => Ok(LevelUnits::Hpa),
        other => bail!("unknown level units: {other:?} (expected \"Pa\" or \"hPa\")"),
    }
}

/// Builds validated [`PhysicalConstants`] from the TOML constants table.
pub fn build_constants(c: &ConstantsToml) -> Result<PhysicalConstants> {
    let constants = PhysicalConstants::new()
        .with_reference_pressure(c.p0)
        .with_planet_radius(c.a)
        .with_rotation_rate(c.omega)
        .with_scale_height(c.h)
        .with_gravity(c.g0);
    constants
        .validate()
        .context("invalid [constants] in config")?;
    Ok(constants)
}

fn build_variable_names(v: &VariablesToml) -> FluxVariableNames {
    FluxVariableNames {
        u: v.u.clone(),
        theta: v.theta.clone(),
        v: v.v.clone(),
        w: v.w.clone(),
        uv: v.uv.clone(),
        uw: v.uw.clone(),
        vtheta: v.vtheta.clone(),
    }
}

/// Builds a [`ReaderConfig`] from the TOML I/O configuration.
pub fn build_reader_config(io: &IoToml) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::default()
        .with_file_prefix(&io.file_prefix)
        .with_time_var(&io.time_var)
        .with_level_var(&io.level_var)
        .with_lat_var(&io.lat_var)
        .with_level_units(parse_level_units(&io.level_units)?)
        .with_variables(build_variable_names(&io.variables));
    cfg.validate().context("invalid [io] in config")?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] that reuses the input coordinate names.
pub fn build_writer_config(io: &IoToml) -> WriterConfig {
    WriterConfig::default()
        .with_time_var(&io.time_var)
        .with_level_var(&io.level_var)
        .with_lat_var(&io.lat_var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_units_parse_case_insensitively() {
        assert_eq!(parse_level_units("Pa").unwrap(), LevelUnits::Pa);
        assert_eq!(parse_level_units("hPa").unwrap(), LevelUnits::Hpa);
        assert_eq!(parse_level_units("HPA").unwrap(), LevelUnits::Hpa);
        assert_eq!(parse_level_units("mb").unwrap(), LevelUnits::Hpa);
        assert!(parse_level_units("bar").is_err());
    }

    #[test]
    fn default_constants_match_library_defaults() {
        let c = build_constants(&ConstantsToml::default()).unwrap();
        assert_eq!(c, PhysicalConstants::new());
    }

    #[test]
    fn invalid_constants_rejected() {
        let toml = ConstantsToml {
            h: -1.0,
            ..ConstantsToml::default()
        };
        let err = build_constants(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("[constants]"));
    }

    #[test]
    fn reader_config_takes_names_from_toml() {
        let io = IoToml {
            level_var: "lev".to_string(),
            file_prefix: "ctem".to_string(),
            ..IoToml::default()
        };
        let cfg = build_reader_config(&io).unwrap();
        assert_eq!(cfg.level_var(), "lev");
        assert_eq!(cfg.file_prefix(), "ctem");
    }

    #[test]
    fn reader_config_rejects_bad_units() {
        let io = IoToml {
            level_units: "sigma".to_string(),
            ..IoToml::default()
        };
        assert!(build_reader_config(&io).is_err());
    }
}
