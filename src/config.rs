//! Engine and logging configuration.
//!
//! Loaded from YAML. `Config::load` reads the file named by
//! `WEBMACHINE_CONFIG` and falls back to defaults when it is unset;
//! `WEBMACHINE_LOG` overrides the log level either way.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "WEBMACHINE_CONFIG";
pub const LOG_ENV: &str = "WEBMACHINE_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Shown in the footer of default error pages.
    pub server_name: String,
    /// Upper bound on one traversal, checked between decisions.
    pub traversal_timeout_ms: Option<u64>,
    /// Guard against decision graphs that never reach a status.
    pub max_decisions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_name: "webmachine-rs".to_string(),
            traversal_timeout_ms: None,
            max_decisions: 256,
        }
    }
}

impl EngineConfig {
    pub fn traversal_timeout(&self) -> Option<Duration> {
        self.traversal_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `webmachine=debug`.
    pub level: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reads the file named by `WEBMACHINE_CONFIG`, or starts from defaults,
    /// then applies `WEBMACHINE_LOG`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(level) = std::env::var(LOG_ENV) {
            config.logging.level = level;
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_decisions == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_decisions must be greater than zero".to_string(),
            ));
        }
        if self.engine.traversal_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "engine.traversal_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
