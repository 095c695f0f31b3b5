//! Persistent configuration for cxindex.
//!
//! Loads/saves a TOML config at `~/.cxindex/config.toml`.

use crate::CxindexError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level cxindex configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CxindexConfig {
    pub storage: StorageConfig,
    pub indexing: IndexingConfig,
}

impl CxindexConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, CxindexError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CxindexError::Config(e.to_string()))
    }

    /// Save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), CxindexError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CxindexError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, or return defaults if the file doesn't exist.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Default config path: `~/.cxindex/config.toml`.
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cxindex")
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    pub db_path: String,
    /// SQLite cache size in MB.
    pub cache_size_mb: u32,
    /// SQLite busy timeout in seconds.
    pub busy_timeout_secs: u64,
    /// Read-only connections serving lookups while a writer is active.
    pub reader_connections: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: home_dir()
                .join("index.db")
                .to_string_lossy()
                .into_owned(),
            cache_size_mb: 64,
            busy_timeout_secs: 5,
            reader_connections: 4,
        }
    }
}

/// Incremental indexing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Skip translation units whose content hash is unchanged.
    pub skip_unchanged: bool,
    /// Rewrite non-key attributes of existing bindings at their definitions.
    pub refresh_definitions: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            skip_unchanged: true,
            refresh_definitions: true,
        }
    }
}
