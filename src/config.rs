use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::sports::{NbaCalibration, NhlCalibration};

/// Main configuration structure
///
/// Every section has defaults, so an empty config directory yields the
/// built-in calibration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub nhl: NhlCalibration,
    #[serde(default)]
    pub nba: NbaCalibration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` string)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,pickline=debug".to_string()
}

impl EngineConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory, then validate it
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config = Self::read_from(config_dir.as_ref())?;
        if let Err(errors) = config.validate() {
            for e in &errors {
                warn!("Config validation: {}", e);
            }
            return Err(EngineError::calibration(errors.join("; ")));
        }
        Ok(config)
    }

    fn read_from(config_dir: &Path) -> std::result::Result<Self, ConfigError> {
        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PICKLINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PICKLINE__NHL__TOTAL_SIGMA, etc.)
            .add_source(
                Environment::with_prefix("PICKLINE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate calibration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.nhl.collect_errors(&mut errors);
        self.nba.collect_errors(&mut errors);

        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pickline-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info,pickline=debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_from_empty_dir_uses_defaults() {
        let dir = scratch_dir("empty");
        let config = EngineConfig::load_from(&dir).unwrap();
        assert_eq!(config, EngineConfig::default());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_overrides_calibration() {
        let dir = scratch_dir("override");
        fs::write(
            dir.join("default.toml"),
            r#"
[logging]
json = true

[nhl]
version = "nhl-test"
total_sigma = 2.5

[nhl.total_weights]
pace = 0.05

[nba]
key_margins = [3.0, 7.0]
"#,
        )
        .unwrap();

        let config = EngineConfig::load_from(&dir).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.nhl.version, "nhl-test");
        assert_eq!(config.nhl.total_sigma, 2.5);
        assert_eq!(config.nhl.total_weights.pace, 0.05);
        assert_eq!(config.nhl.total_weights.goalie_quality, 0.30);
        assert_eq!(config.nba.key_margins, vec![3.0, 7.0]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_rejects_bad_calibration() {
        let dir = scratch_dir("invalid");
        fs::write(
            dir.join("default.toml"),
            r#"
[nba.spread_weights]
projection_margin = 0.9
net_rating_delta = 0.9
"#,
        )
        .unwrap();

        let err = EngineConfig::load_from(&dir).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCalibration(_)));
        assert!(err.to_string().contains("nba.spread_weights"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_collects_every_error() {
        let mut config = EngineConfig::default();
        config.nhl.margin_sigma = -1.0;
        config.nba.total_thresholds.min_coverage_fire = 1.5;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
