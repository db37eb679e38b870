//! Success values returned by lock manager operations
//!
//! Benign repeats ("already locked", "not locked") are reported here rather
//! than through `VaultError`, so callers can render them distinctly.

use crate::store::{Deliverable, DeliverableId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of `mark_optimized`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeOutcome {
    Optimized,
    AlreadyOptimized,
}

/// Result of `lock`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LockOutcome {
    /// This call exported and locked the deliverable
    Locked {
        exported_path: PathBuf,
        locked_at: DateTime<Utc>,
    },
    /// An earlier lock event is still in force
    AlreadyLocked {
        exported_path: Option<PathBuf>,
        locked_at: Option<DateTime<Utc>>,
    },
}

impl LockOutcome {
    /// Artifact of the lock event in force
    pub fn exported_path(&self) -> Option<&Path> {
        match self {
            Self::Locked { exported_path, .. } => Some(exported_path),
            Self::AlreadyLocked { exported_path, .. } => exported_path.as_deref(),
        }
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Locked { locked_at, .. } => Some(*locked_at),
            Self::AlreadyLocked { locked_at, .. } => *locked_at,
        }
    }

    pub fn is_new_lock(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// Result of `unlock`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockOutcome {
    Unlocked,
    NotLocked,
}

/// Where a read was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadSource {
    Cache,
    Store,
}

/// A deliverable returned by `read` or `batch_read`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    pub deliverable: Deliverable,
    pub source: ReadSource,
}

/// Aggregate result of `export_all_optimized`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportSummary {
    /// Deliverables locked by this batch
    pub exported: usize,
    /// Deliverables that were locked concurrently before the batch reached them
    pub already_locked: usize,
    /// Per-deliverable failures
    pub errors: Vec<(DeliverableId, String)>,
}

impl ExportSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
