//! Configuration management for stackpin
//!
//! Settings load from environment variables with sensible defaults; CLI
//! flags override them afterwards.
//!
//! # Environment Variables
//!
//! - `STACKPIN_MANIFEST`: path to the composition manifest - default: "docker-compose.yml"
//! - `STACKPIN_OVERRIDE`: path to the generated override document - default: "docker-compose.override.yml"
//! - `STACKPIN_ROOT`: root the per-service `src` paths are resolved against - default: "."
//! - `STACKPIN_LOG_LEVEL`: logging level - default: "info"

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_MANIFEST: &str = "docker-compose.yml";
const DEFAULT_OVERRIDE: &str = "docker-compose.override.yml";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Manifest and override paths must differ (both are {0})")]
    SamePath(String),

    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone)]
pub struct StackpinConfig {
    /// Composition manifest (the base compose file)
    pub manifest_path: PathBuf,

    /// Override document regenerated on successful runs
    pub override_path: PathBuf,

    /// Root the per-service `src` paths are resolved against
    pub project_root: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for StackpinConfig {
    /// Load from environment variables with defaults
    fn default() -> Self {
        Self {
            manifest_path: env::var("STACKPIN_MANIFEST")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MANIFEST)),
            override_path: env::var("STACKPIN_OVERRIDE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OVERRIDE)),
            project_root: env::var("STACKPIN_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            log_level: env::var("STACKPIN_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl StackpinConfig {
    /// Apply a CLI-level manifest override
    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        if let Some(manifest) = manifest {
            self.manifest_path = manifest;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_path == self.override_path {
            return Err(ConfigError::SamePath(
                self.manifest_path.display().to_string(),
            ));
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StackpinConfig {
        StackpinConfig {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            override_path: PathBuf::from(DEFAULT_OVERRIDE),
            project_root: PathBuf::from("."),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_same_path_rejected() {
        let mut config = base();
        config.override_path = config.manifest_path.clone();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::SamePath(_))
        ));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = base();
        config.log_level = "loud".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_with_manifest_override() {
        let config = base().with_manifest(Some(PathBuf::from("stack.yml")));
        assert_eq!(config.manifest_path, PathBuf::from("stack.yml"));

        let config = base().with_manifest(None);
        assert_eq!(config.manifest_path, PathBuf::from(DEFAULT_MANIFEST));
    }
}
