//! Storage configuration.
//!
//! Reads the knobs the in-memory heap and B+Tree need but spec.md leaves to
//! "the storage layer": block size and a (currently unused by the in-memory
//! implementation, but still modeled) data directory, in case a future
//! on-disk `DbFile` wants the same config shape.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Size, in bytes, of a block (a page-sized unit per spec.md §4.6).
    #[serde(default = "default_block_size_bytes")]
    pub block_size_bytes: usize,

    /// Directory relation and index files would live under, were this
    /// backed by real files instead of in-memory blocks. Unused by
    /// `storage::heap`, kept so the config shape survives a future on-disk
    /// implementation.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            block_size_bytes: default_block_size_bytes(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_block_size_bytes() -> usize {
    4096
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Config {
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.block_size_bytes < 64 {
            return Err(ConfigError::Validation(format!(
                "storage.block_size_bytes must be at least 64, got {}",
                self.storage.block_size_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn block_size_below_minimum_is_rejected() {
        let toml = "[storage]\nblock_size_bytes = 8";
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("block_size_bytes"));
    }

    #[test]
    fn missing_storage_section_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.storage.block_size_bytes, default_block_size_bytes());
    }
}
