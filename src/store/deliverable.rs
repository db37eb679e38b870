//! Deliverable and administrator records

use crate::error::{VaultError, VaultResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default upper bound on serialized content size (4 MiB)
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 4 * 1024 * 1024;

/// Unique deliverable identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliverableId(pub i64);

impl fmt::Display for DeliverableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeliverableId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for DeliverableId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Opaque document body
///
/// The vault never interprets content. It only serializes, size-checks and
/// checksums it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(Value);

impl Content {
    /// Wrap an already-parsed JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse content from JSON text
    ///
    /// Malformed input is an error; there is no fallback to empty content.
    pub fn parse(raw: &str) -> VaultResult<Self> {
        serde_json::from_str(raw)
            .map(Self)
            .map_err(|e| VaultError::ContentParse(e.to_string()))
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Canonical compact serialization (object keys sorted)
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }

    /// Size of the canonical serialization in bytes
    pub fn encoded_len(&self) -> usize {
        self.0.to_string().len()
    }

    /// Reject content whose serialization exceeds `limit` bytes
    pub fn ensure_within(&self, limit: usize) -> VaultResult<()> {
        let size = self.encoded_len();
        if size > limit {
            return Err(VaultError::ContentTooLarge { size, limit });
        }
        Ok(())
    }
}

impl Default for Content {
    fn default() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Lifecycle state derived from the optimized/locked flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableState {
    Draft,
    Optimized,
    Locked,
}

impl fmt::Display for DeliverableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Optimized => "optimized",
            Self::Locked => "locked",
        };
        write!(f, "{}", name)
    }
}

/// Durable deliverable record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    /// Unique identifier
    pub id: DeliverableId,

    /// Display label
    pub name: String,

    /// Document body
    pub content: Content,

    /// Set by the external quality gate, never reset
    pub is_optimized: bool,

    /// Frozen and exported
    pub is_locked: bool,

    /// When the current lock was taken
    pub locked_at: Option<DateTime<Utc>>,

    /// Artifact written by the current lock event
    pub exported_path: Option<PathBuf>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl Deliverable {
    /// Create a new draft deliverable
    pub fn new(id: DeliverableId, name: impl Into<String>, content: Content) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            content,
            is_optimized: false,
            is_locked: false,
            locked_at: None,
            exported_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DeliverableState {
        match (self.is_optimized, self.is_locked) {
            (_, true) => DeliverableState::Locked,
            (true, false) => DeliverableState::Optimized,
            (false, false) => DeliverableState::Draft,
        }
    }

    /// Apply a partial update in place
    ///
    /// Store backends call this so every backend interprets updates the same
    /// way. Precondition checks belong to the lock manager, not here.
    pub fn apply(&mut self, update: &DeliverableUpdate) {
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(optimized) = update.is_optimized {
            self.is_optimized = optimized;
        }
        match &update.lock {
            Some(LockChange::Lock {
                locked_at,
                exported_path,
            }) => {
                self.is_locked = true;
                self.locked_at = Some(*locked_at);
                self.exported_path = Some(exported_path.clone());
            }
            Some(LockChange::Unlock) => {
                self.is_locked = false;
                self.locked_at = None;
                self.exported_path = None;
            }
            None => {}
        }
        self.updated_at = Utc::now();
    }
}

/// Lock-flag transition carried by an update
#[derive(Debug, Clone, PartialEq)]
pub enum LockChange {
    /// Set `is_locked`, `locked_at` and `exported_path` together
    Lock {
        locked_at: DateTime<Utc>,
        exported_path: PathBuf,
    },
    /// Clear `is_locked`, `locked_at` and `exported_path` together
    Unlock,
}

/// Partial update of a deliverable record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliverableUpdate {
    pub content: Option<Content>,
    pub is_optimized: Option<bool>,
    pub lock: Option<LockChange>,
}

impl DeliverableUpdate {
    pub fn content(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn optimized() -> Self {
        Self {
            is_optimized: Some(true),
            ..Self::default()
        }
    }

    pub fn locked(locked_at: DateTime<Utc>, exported_path: PathBuf) -> Self {
        Self {
            lock: Some(LockChange::Lock {
                locked_at,
                exported_path,
            }),
            ..Self::default()
        }
    }

    pub fn unlocked() -> Self {
        Self {
            lock: Some(LockChange::Unlock),
            ..Self::default()
        }
    }
}

/// Flag-based selection for `find_by_flags`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagFilter {
    pub is_optimized: Option<bool>,
    pub is_locked: Option<bool>,
}

impl FlagFilter {
    /// Every deliverable
    pub fn all() -> Self {
        Self::default()
    }

    /// Currently locked deliverables
    pub fn locked() -> Self {
        Self {
            is_optimized: None,
            is_locked: Some(true),
        }
    }

    /// Optimized but not yet locked
    pub fn ready_to_lock() -> Self {
        Self {
            is_optimized: Some(true),
            is_locked: Some(false),
        }
    }

    /// Not yet optimized
    pub fn drafts() -> Self {
        Self {
            is_optimized: Some(false),
            is_locked: Some(false),
        }
    }

    /// Whether a record passes this filter
    pub fn matches(&self, deliverable: &Deliverable) -> bool {
        self.is_optimized.is_none_or(|v| v == deliverable.is_optimized)
            && self.is_locked.is_none_or(|v| v == deliverable.is_locked)
    }
}

/// Principal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

/// Principal allowed (when `role` is admin) to unlock deliverables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Administrator {
    pub username: String,
    pub role: Role,
    /// Salted digest produced by `lock::credential::hash_password`
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Administrator {
    pub fn new(username: impl Into<String>, role: Role, password_hash: String) -> Self {
        Self {
            username: username.into(),
            role,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
