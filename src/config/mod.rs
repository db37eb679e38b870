//! Configuration file and default locations
//!
//! The config file lives at `~/.config/dlock/config.toml` unless `--config`
//! or `DLOCK_CONFIG` names another one. Store, exports and the audit log
//! default to the platform state directory.

pub mod schema;

pub use schema::Config;

use crate::error::{VaultError, VaultResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Loads and saves one config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `path` if given, else the per-user default
    pub fn locate(path: Option<PathBuf>) -> Self {
        let config_path = path.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("dlock")
                .join("config.toml")
        });
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dlock")
    }

    pub fn store_dir() -> PathBuf {
        Self::state_dir().join("store")
    }

    pub fn exports_dir() -> PathBuf {
        Self::state_dir().join("exports")
    }

    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Parse the config file; a missing file means all defaults
    pub async fn load(&self) -> VaultResult<Config> {
        let raw = match fs::read_to_string(&self.config_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(VaultError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&raw).map_err(|e| VaultError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory if needed
    pub async fn save(&self, config: &Config) -> VaultResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| VaultError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        fs::write(&self.config_path, toml::to_string_pretty(config)?)
            .await
            .map_err(|e| {
                VaultError::io(format!("writing config to {}", self.config_path.display()), e)
            })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }
}
