//! Run configuration, read from a JSON file.
//!
//! Every field carries a default so an empty `{}` file is a valid
//! configuration; unknown keys are rejected to catch typos.

use std::env;
use std::fs;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use serde::Deserialize;

use crate::errors::GeomagError;
use crate::output::ZColumn;
use crate::sampling::DecimalYearMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Satellite selector: catalog number or a name substring. With `None`
    /// every element set of the input file is a candidate.
    pub satellite: Option<String>,
    /// Sampling window length in seconds
    pub duration: f64,
    /// Sampling step in seconds
    pub timestep: f64,
    /// Window start as an ISO-8601 UTC instant; defaults to the epoch of the
    /// selected element set
    pub start: Option<String>,
    /// Directory prepended to a relative `tle-file`
    pub tle_dir: Option<Utf8PathBuf>,
    /// Two-line element input file
    pub tle_file: Utf8PathBuf,
    /// Directory prepended to a relative `output-file`
    pub output_dir: Option<Utf8PathBuf>,
    /// Destination of the rendered table
    pub output_file: Utf8PathBuf,
    /// Directory holding the `*.cof` geomagnetic coefficient files
    pub geomag_data_dir: Utf8PathBuf,
    pub decimal_year: DecimalYearMode,
    pub z_column: ZColumn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            satellite: None,
            duration: 6000.0,
            timestep: 20.0,
            start: None,
            tle_dir: None,
            tle_file: Utf8PathBuf::from("orbit.tle"),
            output_dir: None,
            output_file: Utf8PathBuf::from("geomag_table.txt"),
            geomag_data_dir: default_data_dir(),
            decimal_year: DecimalYearMode::default(),
            z_column: ZColumn::default(),
        }
    }
}

/// `$HOME/.geomag-data`, falling back to the working directory when the
/// environment gives no usable home.
fn default_data_dir() -> Utf8PathBuf {
    env::var("HOME")
        .map(|home| Utf8PathBuf::from(home).join(".geomag-data"))
        .unwrap_or_else(|_| Utf8PathBuf::from("."))
}

impl Config {
    /// Read and parse a configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, GeomagError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric fields for consistency.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::Configuration`] on a non-positive timestep or a
    ///   negative duration.
    pub fn validate(&self) -> Result<(), GeomagError> {
        if !(self.timestep > 0.0) {
            return Err(GeomagError::Configuration(format!(
                "timestep must be strictly positive, got {}",
                self.timestep
            )));
        }
        if self.duration < 0.0 {
            return Err(GeomagError::Configuration(format!(
                "duration must not be negative, got {}",
                self.duration
            )));
        }
        Ok(())
    }

    /// Effective element-file location: `tle-file`, placed under `tle-dir`
    /// when the file path is relative and a directory is configured.
    pub fn tle_path(&self) -> Utf8PathBuf {
        join_path(self.tle_dir.as_deref(), &self.tle_file)
    }

    /// Effective output location, resolved like [`Config::tle_path`].
    pub fn output_path(&self) -> Utf8PathBuf {
        join_path(self.output_dir.as_deref(), &self.output_file)
    }

}

fn join_path(dir: Option<&Utf8Path>, file: &Utf8Path) -> Utf8PathBuf {
    match dir {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.to_owned(),
    }
}

/// Parse an ISO-8601 instant, accepting both a trailing `Z` and a bare
/// date-time (interpreted as UTC).
pub fn parse_utc_epoch(text: &str) -> Result<Epoch, GeomagError> {
    let text = text.trim();
    if let Ok(epoch) = Epoch::from_str(text) {
        return Ok(epoch);
    }
    let retry = match text.strip_suffix('Z') {
        Some(stripped) => format!("{stripped} UTC"),
        None => format!("{text} UTC"),
    };
    Epoch::from_str(&retry).map_err(|_| GeomagError::EpochParse(text.to_string()))
}

#[cfg(test)]
mod config_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.satellite, None);
        assert_abs_diff_eq!(config.duration, 6000.0);
        assert_abs_diff_eq!(config.timestep, 20.0);
        assert_eq!(config.decimal_year, DecimalYearMode::FixedAtStart);
        assert_eq!(config.z_column, ZColumn::TrueZ);
        config.validate().unwrap();
    }

    #[test]
    fn test_full_configuration() {
        let config: Config = serde_json::from_str(
            r#"{
                "satellite": "39412",
                "duration": 3600.0,
                "timestep": 10.0,
                "start": "2013-12-09T03:05:40Z",
                "tle-file": "/tmp/sat.tle",
                "output-file": "/tmp/out.txt",
                "geomag-data-dir": "/tmp/cof",
                "decimal-year": "per-sample",
                "z-column": "legacy-y-duplicate"
            }"#,
        )
        .unwrap();
        assert_eq!(config.satellite.as_deref(), Some("39412"));
        assert_eq!(config.tle_file, Utf8PathBuf::from("/tmp/sat.tle"));
        assert_eq!(config.decimal_year, DecimalYearMode::PerSample);
        assert_eq!(config.z_column, ZColumn::LegacyYDuplicate);
    }

    #[test]
    fn test_path_resolution() {
        let mut config = Config::default();
        assert_eq!(config.tle_path(), Utf8PathBuf::from("orbit.tle"));

        config.tle_dir = Some(Utf8PathBuf::from("/data/tle"));
        assert_eq!(config.tle_path(), Utf8PathBuf::from("/data/tle/orbit.tle"));

        // an absolute file path ignores the directory
        config.tle_file = Utf8PathBuf::from("/tmp/other.tle");
        assert_eq!(config.tle_path(), Utf8PathBuf::from("/tmp/other.tle"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"step": 20.0}"#).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.timestep = 0.0;
        assert!(config.validate().is_err());
        config.timestep = 20.0;
        config.duration = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_utc_epoch_variants() {
        let reference = Epoch::from_gregorian_utc(2013, 12, 9, 3, 5, 40, 0);
        assert_eq!(parse_utc_epoch("2013-12-09T03:05:40Z").unwrap(), reference);
        assert_eq!(
            parse_utc_epoch("2013-12-09T03:05:40 UTC").unwrap(),
            reference
        );
        assert_eq!(parse_utc_epoch("2013-12-09T03:05:40").unwrap(), reference);
        assert!(matches!(
            parse_utc_epoch("not a date"),
            Err(GeomagError::EpochParse(_))
        ));
    }
}
