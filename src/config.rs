use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TEM configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemConfig {
    /// Experiment names; each is a sub-directory of `io.input_dir`.
    #[serde(default)]
    pub experiments: Vec<String>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,

    /// Physical constants.
    #[serde(default)]
    pub constants: ConstantsToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_time_var")]
    pub time_var: String,
    #[serde(default = "default_level_var")]
    pub level_var: String,
    #[serde(default = "default_lat_var")]
    pub lat_var: String,
    #[serde(default = "default_level_units")]
    pub level_units: String,
    /// Time steps per computation chunk; 0 processes the whole record.
    #[serde(default)]
    pub time_chunk: usize,
    #[serde(default)]
    pub variables: VariablesToml,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            file_prefix: default_file_prefix(),
            time_var: default_time_var(),
            level_var: default_level_var(),
            lat_var: default_lat_var(),
            level_units: default_level_units(),
            time_chunk: 0,
            variables: VariablesToml::default(),
        }
    }
}

fn default_file_prefix() -> String {
    "TEMdiags".to_string()
}
fn default_time_var() -> String {
    "time".to_string()
}
fn default_level_var() -> String {
    "ilev".to_string()
}
fn default_lat_var() -> String {
    "lat".to_string()
}
fn default_level_units() -> String {
    "hPa".to_string()
}

/// Input variable names.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablesToml {
    #[serde(default = "default_u")]
    pub u: String,
    #[serde(default = "default_theta")]
    pub theta: String,
    #[serde(default = "default_v")]
    pub v: String,
    #[serde(default = "default_w")]
    pub w: String,
    #[serde(default = "default_uv")]
    pub uv: String,
    #[serde(default = "default_uw")]
    pub uw: String,
    #[serde(default = "default_vtheta")]
    pub vtheta: String,
}

impl Default for VariablesToml {
    fn default() -> Self {
        Self {
            u: default_u(),
            theta: default_theta(),
            v: default_v(),
            w: default_w(),
            uv: default_uv(),
            uw: default_uw(),
            vtheta: default_vtheta(),
        }
    }
}

fn default_u() -> String {
    "Uzm".to_string()
}
fn default_theta() -> String {
    "THzm".to_string()
}
fn default_v() -> String {
    "Vzm".to_string()
}
fn default_w() -> String {
    "Wzm".to_string()
}
fn default_uv() -> String {
    "UVzm".to_string()
}
fn default_uw() -> String {
    "UWzm".to_string()
}
fn default_vtheta() -> String {
    "VTHzm".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantsToml {
    /// Reference pressure (Pa).
    #[serde(default = "default_p0")]
    pub p0: f64,
    /// Planet radius (m).
    #[serde(default = "default_a")]
    pub a: f64,
    /// Rotation rate (rad/s).
    #[serde(default = "default_omega")]
    pub omega: f64,
    /// Scale height (m).
    #[serde(default = "default_h")]
    pub h: f64,
    /// Gravitational acceleration (m/s²).
    #[serde(default = "default_g0")]
    pub g0: f64,
}

impl Default for ConstantsToml {
    fn default() -> Self {
        Self {
            p0: default_p0(),
            a: default_a(),
            omega: default_omega(),
            h: default_h(),
            g0: default_g0(),
        }
    }
}

fn default_p0() -> f64 {
    101_325.0
}
fn default_a() -> f64 {
    6.371e6
}
fn default_omega() -> f64 {
    7.29212e-5
}
fn default_h() -> f64 {
    7000.0
}
fn default_g0() -> f64 {
    9.80665
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: TemConfig = toml::from_str("").unwrap();
        assert!(cfg.experiments.is_empty());
        assert!(cfg.io.input_dir.is_none());
        assert_eq!(cfg.io.file_prefix, "TEMdiags");
        assert_eq!(cfg.io.level_var, "ilev");
        assert_eq!(cfg.io.level_units, "hPa");
        assert_eq!(cfg.io.time_chunk, 0);
        assert_eq!(cfg.io.variables.vtheta, "VTHzm");
        assert_eq!(cfg.constants.p0, 101_325.0);
        assert_eq!(cfg.constants.g0, 9.80665);
    }

    #[test]
    fn full_config_parses() {
        let cfg: TemConfig = toml::from_str(
            r#"
            experiments = ["L70_bugfix", "sponge5"]

            [io]
            input_dir = "/data/TEMdiags"
            output_dir = "/data/out"
            level_var = "lev"
            level_units = "Pa"
            time_chunk = 12

            [io.variables]
            theta = "THETAzm"

            [constants]
            a = 3.3895e6
            "#,
        )
        .unwrap();
        assert_eq!(cfg.experiments, vec!["L70_bugfix", "sponge5"]);
        assert_eq!(cfg.io.input_dir, Some(PathBuf::from("/data/TEMdiags")));
        assert_eq!(cfg.io.level_var, "lev");
        assert_eq!(cfg.io.time_chunk, 12);
        assert_eq!(cfg.io.variables.theta, "THETAzm");
        assert_eq!(cfg.io.variables.u, "Uzm");
        assert_eq!(cfg.constants.a, 3.3895e6);
        assert_eq!(cfg.constants.h, 7000.0);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(toml::from_str::<TemConfig>("[constants]\nkappa = 0.286").is_err());
        assert!(toml::from_str::<TemConfig>("experiment = [\"x\"]").is_err());
    }
}
