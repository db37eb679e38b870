//! In-process store backend

use crate::error::{VaultError, VaultResult};
use crate::store::{
    Administrator, Content, Deliverable, DeliverableId, DeliverableUpdate, FlagFilter,
    PersistentStore, Role,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    deliverables: BTreeMap<DeliverableId, Deliverable>,
    administrators: HashMap<String, Administrator>,
}

/// Store backed by in-memory maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, keeping its id
    pub async fn seed(&self, deliverable: Deliverable) {
        let mut tables = self.tables.write().await;
        tables.deliverables.insert(deliverable.id, deliverable);
    }

    /// Number of stored deliverables
    pub async fn len(&self) -> usize {
        self.tables.read().await.deliverables.len()
    }

    /// Whether the store holds no deliverables
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get_deliverable(&self, id: DeliverableId) -> VaultResult<Option<Deliverable>> {
        Ok(self.tables.read().await.deliverables.get(&id).cloned())
    }

    async fn get_deliverables(&self, ids: &[DeliverableId]) -> VaultResult<Vec<Deliverable>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.deliverables.get(id).cloned())
            .collect())
    }

    async fn update_deliverable(
        &self,
        id: DeliverableId,
        update: &DeliverableUpdate,
    ) -> VaultResult<Deliverable> {
        let mut tables = self.tables.write().await;
        let record = tables
            .deliverables
            .get_mut(&id)
            .ok_or(VaultError::NotFound(id))?;
        record.apply(update);
        Ok(record.clone())
    }

    async fn find_by_flags(&self, filter: &FlagFilter) -> VaultResult<Vec<Deliverable>> {
        let tables = self.tables.read().await;
        Ok(tables
            .deliverables
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn insert_deliverable(&self, name: &str, content: Content) -> VaultResult<Deliverable> {
        let mut tables = self.tables.write().await;
        let next = tables
            .deliverables
            .keys()
            .next_back()
            .map_or(1, |id| id.0 + 1);
        let record = Deliverable::new(DeliverableId(next), name, content);
        tables.deliverables.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_administrator(&self, username: &str) -> VaultResult<Option<Administrator>> {
        let tables = self.tables.read().await;
        Ok(tables
            .administrators
            .get(username)
            .filter(|a| a.role == Role::Admin)
            .cloned())
    }

    async fn put_administrator(&self, admin: &Administrator) -> VaultResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .administrators
            .insert(admin.username.clone(), admin.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
