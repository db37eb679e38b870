//! Cache entry and partial-update types

use crate::store::{Content, Deliverable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Snapshot of a locked deliverable held by the cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedEntry {
    /// Mirrored record
    pub deliverable: Deliverable,

    /// When the entry was inserted or last refreshed
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn new(deliverable: Deliverable) -> Self {
        Self {
            deliverable,
            cached_at: Utc::now(),
        }
    }
}

/// Fields `ArtifactCache::update` may merge into an existing entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachePatch {
    pub name: Option<String>,
    pub content: Option<Content>,
    pub is_optimized: Option<bool>,
    pub is_locked: Option<bool>,
    pub locked_at: Option<DateTime<Utc>>,
    pub exported_path: Option<PathBuf>,
}

impl CachePatch {
    pub fn optimized() -> Self {
        Self {
            is_optimized: Some(true),
            ..Self::default()
        }
    }

    /// Whether applying this patch would leave the entry unlocked
    pub(crate) fn unlocks(&self) -> bool {
        self.is_locked == Some(false)
    }

    pub(crate) fn apply_to(&self, deliverable: &mut Deliverable) {
        if let Some(name) = &self.name {
            deliverable.name = name.clone();
        }
        if let Some(content) = &self.content {
            deliverable.content = content.clone();
        }
        if let Some(optimized) = self.is_optimized {
            deliverable.is_optimized = optimized;
        }
        if let Some(locked) = self.is_locked {
            deliverable.is_locked = locked;
        }
        if let Some(locked_at) = self.locked_at {
            deliverable.locked_at = Some(locked_at);
        }
        if let Some(path) = &self.exported_path {
            deliverable.exported_path = Some(path.clone());
        }
    }
}
