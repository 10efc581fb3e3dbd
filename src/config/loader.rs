//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the overtime
//! rules from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{ExportConfig, PipelineConfig, ThresholdConfig, TranslationConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/payroll/
/// ├── thresholds.yaml    # Daily and weekly hour caps
/// ├── translations.yaml  # Company, jurisdiction and hour-type tables
/// └── export.yaml        # Subjob padding and phase code split
/// ```
///
/// # Example
///
/// ```no_run
/// use overtime_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// println!("Weekly cap: {}", loader.config().thresholds.weekly_regular_hours);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: PipelineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any required field is missing from the configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use overtime_ledger::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/payroll")?;
    /// # Ok::<(), overtime_ledger::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let thresholds = Self::load_yaml::<ThresholdConfig>(&path.join("thresholds.yaml"))?;
        let translations = Self::load_yaml::<TranslationConfig>(&path.join("translations.yaml"))?;
        let export = Self::load_yaml::<ExportConfig>(&path.join("export.yaml"))?;

        debug!(path = %path.display(), "Loaded overtime configuration");

        Ok(Self {
            config: PipelineConfig {
                thresholds,
                translations,
                export,
            },
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn config_path() -> &'static str {
        "./config/payroll"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
    }

    #[test]
    fn test_shipped_configuration_matches_defaults() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.config(), &PipelineConfig::default());
    }

    #[test]
    fn test_thresholds_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let thresholds = &loader.config().thresholds;

        assert_eq!(thresholds.daily_regular_hours, Decimal::from(8));
        assert_eq!(thresholds.daily_overtime_hours, Decimal::from(4));
        assert_eq!(thresholds.weekly_regular_hours, Decimal::from(40));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("thresholds.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("thresholds.yaml"), "daily_regular_hours: [").unwrap();

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("thresholds.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("thresholds.yaml"), "daily_regular_hours: 8\n").unwrap();

        let result = ConfigLoader::load(dir.path());
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }
}
