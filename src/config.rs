//! VM configuration
//!
//! Configuration is plain serde data persisted as pretty JSON, so a run can be
//! reproduced from the file alone.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Configuration for the Corral VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Seed for the main random source (entropy-seeded when absent)
    pub seed: Option<u64>,

    /// Emit a trace event for every agent an exclusive job visits
    pub trace_agents: bool,

    /// Default tracing filter used by the CLI
    pub log_filter: String,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            seed: None,
            trace_agents: false,
            log_filter: "info".to_string(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl VmConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let data = fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Seed to use for the main random source
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corral.json");

        let config = VmConfig {
            seed: Some(42),
            trace_agents: true,
            log_filter: "corral=debug".to_string(),
        };
        config.save(&path).unwrap();

        assert_eq!(VmConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.json");
        fs::write(&path, br#"{ "seed": 7 }"#).unwrap();

        let config = VmConfig::load(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(!config.trace_agents);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.effective_seed(), 7);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = VmConfig::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
