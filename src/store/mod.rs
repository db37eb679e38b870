//! Persistent store abstraction
//!
//! The store is the single writer of truth for deliverable records. The lock
//! manager talks to it only through [`PersistentStore`], so any backend that
//! treats each call as an atomic primitive can sit behind it:
//! - [`MemoryStore`]: in-process map, for embedding and tests
//! - [`JsonFileStore`]: one JSON document per record on local disk

pub mod deliverable;
pub mod file;
pub mod memory;

pub use deliverable::{
    Administrator, Content, Deliverable, DeliverableId, DeliverableState, DeliverableUpdate,
    FlagFilter, LockChange, Role, DEFAULT_MAX_CONTENT_BYTES,
};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::VaultResult;
use async_trait::async_trait;

/// Abstract persistence interface
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Fetch a single deliverable
    async fn get_deliverable(&self, id: DeliverableId) -> VaultResult<Option<Deliverable>>;

    /// Fetch several deliverables in one round-trip
    ///
    /// Missing or unreadable ids are simply absent from the result; order is
    /// unspecified. Only a failure of the query as a whole is an error.
    async fn get_deliverables(&self, ids: &[DeliverableId]) -> VaultResult<Vec<Deliverable>>;

    /// Apply a partial update and return the stored record
    async fn update_deliverable(
        &self,
        id: DeliverableId,
        update: &DeliverableUpdate,
    ) -> VaultResult<Deliverable>;

    /// All deliverables matching the given flags, ordered by id
    async fn find_by_flags(&self, filter: &FlagFilter) -> VaultResult<Vec<Deliverable>>;

    /// Create a draft deliverable with a freshly assigned id
    async fn insert_deliverable(&self, name: &str, content: Content) -> VaultResult<Deliverable>;

    /// Look up a principal with the admin role
    ///
    /// Records with any other role, and usernames the backend could never
    /// have stored, are reported as absent.
    async fn get_administrator(&self, username: &str) -> VaultResult<Option<Administrator>>;

    /// Create or replace a principal record
    async fn put_administrator(&self, admin: &Administrator) -> VaultResult<()>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
