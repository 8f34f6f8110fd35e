use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::Strategy;
use crate::error::{Error, Result};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address
    pub bind_addr: String,

    /// Port to listen on (0 selects an ephemeral port)
    pub port: u16,

    /// Maximum number of key-value pairs kept in memory
    pub cache_size: usize,

    /// Cache replacement strategy (FIFO, LRU, or LFU)
    pub cache_strategy: Strategy,

    /// Root directory for persisted key files
    pub data_dir: String,

    /// Maximum number of content lines accepted in one request frame
    pub max_frame_lines: usize,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 50000,
            cache_size: 1024,
            cache_strategy: Strategy::Fifo,
            data_dir: "data".to_string(),
            max_frame_lines: 1024,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.is_empty() {
            return Err(Error::Config("bind_addr must not be empty".to_string()));
        }

        if self.cache_size == 0 {
            return Err(Error::Config("cache_size must be > 0".to_string()));
        }

        // Smallest request frame is 2 lines, largest 3
        if self.max_frame_lines < 3 {
            return Err(Error::Config("max_frame_lines must be >= 3".to_string()));
        }

        Ok(())
    }
}
