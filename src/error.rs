//! Error types for dlock
//!
//! All modules use `VaultResult<T>` as their return type. Benign outcomes such
//! as "already locked" are modelled as success values, never as errors.

use crate::store::DeliverableId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dlock operations
pub type VaultResult<T> = Result<T, VaultError>;

/// All errors that can occur in dlock
#[derive(Error, Debug)]
pub enum VaultError {
    // Lifecycle errors
    #[error("Deliverable not found: {0}")]
    NotFound(DeliverableId),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Unauthorized: invalid administrator credentials")]
    Unauthorized,

    // Export errors
    #[error("Export failed for {path}: {reason}")]
    ExportFailure { path: PathBuf, reason: String },

    #[error("Invalid export artifact {path}: {reason}")]
    ArtifactInvalid { path: PathBuf, reason: String },

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    // Content errors
    #[error("Content is not valid JSON: {0}")]
    ContentParse(String),

    #[error("Content too large: {size} bytes (limit {limit})")]
    ContentTooLarge { size: usize, limit: usize },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl VaultError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a store error from any displayable cause
    pub fn store(reason: impl std::fmt::Display) -> Self {
        Self::Store(reason.to_string())
    }

    /// Create an export failure for a target path
    pub fn export(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ExportFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Store and export failures leave the deliverable in its previous state,
    /// so the same call can simply be repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::ExportFailure { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::PreconditionFailed(reason) if reason.contains("not optimized") => {
                Some("Run: dlock optimize <id>")
            }
            Self::PreconditionFailed(reason) if reason.contains("locked") => {
                Some("Unlock it first: dlock unlock <id> --username <admin>")
            }
            Self::Unauthorized => Some("Check the administrator username and password"),
            Self::NotFound(_) => Some("Run: dlock list"),
            Self::ContentParse(_) => Some("Content must be a single JSON document"),
            _ => None,
        }
    }
}
