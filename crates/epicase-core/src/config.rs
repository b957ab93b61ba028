//! Runtime configuration.
//!
//! Layered as defaults, then an optional file, then `EPICASE__*` environment
//! variables (e.g. `EPICASE__DATABASE__PATH=/var/lib/epicase.db`).

use std::path::Path;

use ::config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_DATABASE_PATH: &str = "epicase.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// File path of the SQLite store; ignored when `in_memory` is set
    pub path: String,
    pub in_memory: bool,
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: DEFAULT_DATABASE_PATH.to_string(),
                in_memory: false,
                busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            },
        }
    }
}

impl CoreConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// A file that does not exist is an error when its path is given explicitly.
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = Config::builder()
            .set_default("database.path", DEFAULT_DATABASE_PATH)?
            .set_default("database.in_memory", false)?
            .set_default("database.busy_timeout_ms", DEFAULT_BUSY_TIMEOUT_MS)?;

        if let Some(path) = file {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("EPICASE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: CoreConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.database.in_memory && self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database.path must be set unless database.in_memory is true".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.database.path, "epicase.db");
        assert!(!config.database.in_memory);
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[database]\npath = \"/tmp/cases.db\"\nbusy_timeout_ms = 250"
        )
        .unwrap();

        let config = CoreConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database.path, "/tmp/cases.db");
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert!(!config.database.in_memory);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            CoreConfig::load(Some(&missing)),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut config = CoreConfig::default();
        config.database.path = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.database.in_memory = true;
        assert!(config.validate().is_ok());
    }
}
