//! Configuration schema for dlock
//!
//! Configuration is stored at `~/.config/dlock/config.toml`

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::store::DEFAULT_MAX_CONTENT_BYTES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Locked-deliverable cache
    pub cache: CacheConfig,

    /// Export artifact location
    pub export: ExportConfig,

    /// Deliverable store location
    pub store: StoreConfig,

    /// Content limits
    pub content: ContentConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging
    pub audit_log: bool,

    /// Audit log location (defaults to the state directory)
    pub audit_log_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
            audit_log_path: None,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached deliverables (0 = caching disabled)
    pub capacity: usize,

    /// Seconds an untouched entry stays cached
    pub ttl_secs: u64,

    /// Load locked deliverables into the cache at startup
    pub preload: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_secs: DEFAULT_TTL.as_secs(),
            preload: true,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Artifact directory (defaults to `<state dir>/exports`)
    pub dir: Option<PathBuf>,
}

/// Store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root (defaults to `<state dir>/store`)
    pub dir: Option<PathBuf>,
}

/// Content limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Maximum serialized content size in bytes
    pub max_bytes: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}
