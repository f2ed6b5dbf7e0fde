//! Tool configuration.
//!
//! The config lives in a JSON file whose path is resolved once in the CLI
//! layer and injected everywhere it is needed; no module reads the
//! filesystem location on its own.

use crate::Cluster;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the user's home directory holding the default config.
pub const CONFIG_DIR_NAME: &str = ".nft-batch-tool";

/// File name of the config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Resolve the default config file path from the environment.
pub fn default_config_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Persistent tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Custom RPC gateway URL; overrides the cluster default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Ledger cluster
    #[serde(default)]
    pub cluster: Cluster,
    /// Signing wallet used for transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypair: Option<String>,
    /// Custom storage gateway URL for uploads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            cluster: Cluster::MainnetBeta,
            keypair: None,
            storage_url: None,
        }
    }
}

impl Config {
    /// Load the config at `path`, writing the default config there first if
    /// the file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config found, writing defaults");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save the config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Read one config value by name.
    pub fn get(&self, name: &str) -> Result<String, ConfigError> {
        match name {
            "rpc_url" => Ok(self.rpc_url.clone().unwrap_or_default()),
            "cluster" => Ok(self.cluster.to_string()),
            "keypair" => Ok(self.keypair.clone().unwrap_or_default()),
            "storage_url" => Ok(self.storage_url.clone().unwrap_or_default()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    /// Set one config value by name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        match name {
            "rpc_url" => self.rpc_url = Some(value.to_string()),
            "cluster" => {
                self.cluster = value.parse().map_err(|e: String| ConfigError::InvalidValue {
                    key: name.to_string(),
                    message: e,
                })?
            }
            "keypair" => self.keypair = Some(value.to_string()),
            "storage_url" => self.storage_url = Some(value.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// All config entries as name/value pairs, for listing.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("rpc_url", self.rpc_url.clone().unwrap_or_default()),
            ("cluster", self.cluster.to_string()),
            ("keypair", self.keypair.clone().unwrap_or_default()),
            ("storage_url", self.storage_url.clone().unwrap_or_default()),
        ]
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading or writing the config file
    #[error("config IO error: {0}")]
    Io(String),

    /// Config file is not valid JSON for the config schema
    #[error("invalid config at {path}: {message}")]
    Parse {
        /// Config file path
        path: String,
        /// Parse failure detail
        message: String,
    },

    /// Unknown config key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value rejected for a known key
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Config key
        key: String,
        /// Rejection detail
        message: String,
    },
}
