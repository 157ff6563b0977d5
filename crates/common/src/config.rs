use std::path::Path;

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "gateway.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Maximum number of payload bytes per shard
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
    /// Maximum number of shards a single payload may be split into
    #[serde(default = "default_max_shards")]
    pub max_shards: usize,
    /// Maximum payload size accepted by a push, in bytes
    #[serde(default = "default_file_size_limit")]
    pub file_size_limit: usize,
    /// Item amount minted with every record
    #[serde(default = "default_mint_amount")]
    pub mint_amount: u64,
}

fn default_shard_size() -> usize {
    200
}

fn default_max_shards() -> usize {
    10
}

fn default_file_size_limit() -> usize {
    1024
}

fn default_mint_amount() -> u64 {
    1
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            shard_size: default_shard_size(),
            max_shards: default_max_shards(),
            file_size_limit: default_file_size_limit(),
            mint_amount: default_mint_amount(),
        }
    }
}

impl GatewayConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard_size == 0 {
            return Err(ConfigError::Invalid("shard_size must be positive".into()));
        }
        if self.max_shards == 0 {
            return Err(ConfigError::Invalid("max_shards must be positive".into()));
        }
        if self.mint_amount == 0 {
            return Err(ConfigError::Invalid("mint_amount must be positive".into()));
        }
        Ok(())
    }
}
