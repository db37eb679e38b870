//! Deliverable lock lifecycle
//!
//! ```text
//! Draft --mark_optimized--> Optimized --lock--> Locked
//!                               ^                  |
//!                               +----unlock(admin)-+
//! ```
//!
//! The manager keeps store, exporter and cache consistent:
//! - state changes for one id are serialized by a per-id async mutex
//! - state changes run on their own task, so a caller that stops waiting
//!   never aborts a half-finished write
//! - the cache only ever receives locked records, and unlock always drops
//!   the entry

use crate::audit::AuditLog;
use crate::cache::{ArtifactCache, CachePatch, CacheStats, CachedEntry};
use crate::error::{VaultError, VaultResult};
use crate::export::ArtifactExporter;
use crate::lock::credential::{verify_password, Credentials};
use crate::lock::outcome::{
    ExportSummary, Fetched, LockOutcome, OptimizeOutcome, ReadSource, UnlockOutcome,
};
use crate::store::{
    Content, Deliverable, DeliverableId, DeliverableUpdate, FlagFilter, PersistentStore,
    DEFAULT_MAX_CONTENT_BYTES,
};
use chrono::Utc;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Builder for [`LockManager`]
pub struct LockManagerBuilder {
    store: Arc<dyn PersistentStore>,
    exporter: ArtifactExporter,
    cache: Arc<ArtifactCache>,
    audit: AuditLog,
    max_content_bytes: usize,
}

impl LockManagerBuilder {
    /// Record state changes to this audit log
    pub fn audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Upper bound on serialized content size for create/edit
    pub fn max_content_bytes(mut self, limit: usize) -> Self {
        self.max_content_bytes = limit;
        self
    }

    pub fn build(self) -> LockManager {
        LockManager {
            inner: Arc::new(Inner {
                store: self.store,
                exporter: self.exporter,
                cache: self.cache,
                audit: self.audit,
                max_content_bytes: self.max_content_bytes,
                guards: Mutex::new(HashMap::new()),
                unlock_epoch: AtomicU64::new(0),
            }),
        }
    }
}

/// Orchestrates the lock/unlock state machine
///
/// Cheap to clone; clones share the same store, cache and per-id locks.
#[derive(Clone)]
pub struct LockManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn PersistentStore>,
    exporter: ArtifactExporter,
    cache: Arc<ArtifactCache>,
    audit: AuditLog,
    max_content_bytes: usize,
    guards: Mutex<HashMap<DeliverableId, Arc<AsyncMutex<()>>>>,
    /// Bumped on every unlock; read-through caching is skipped if it moved
    /// while the record was being loaded
    unlock_epoch: AtomicU64,
}

/// Run a state change on its own task so it completes even if the caller
/// stops waiting
async fn run_to_completion<T, F>(fut: F) -> VaultResult<T>
where
    T: Send + 'static,
    F: Future<Output = VaultResult<T>> + Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| VaultError::Internal(format!("state change task failed: {}", e)))?
}

impl LockManager {
    /// Manager with no audit log and the default content limit
    pub fn new(
        store: Arc<dyn PersistentStore>,
        exporter: ArtifactExporter,
        cache: Arc<ArtifactCache>,
    ) -> Self {
        Self::builder(store, exporter, cache).build()
    }

    pub fn builder(
        store: Arc<dyn PersistentStore>,
        exporter: ArtifactExporter,
        cache: Arc<ArtifactCache>,
    ) -> LockManagerBuilder {
        LockManagerBuilder {
            store,
            exporter,
            cache,
            audit: AuditLog::disabled(),
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.inner.store
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.inner.cache
    }

    pub fn exporter(&self) -> &ArtifactExporter {
        &self.inner.exporter
    }

    /// Create a draft deliverable
    pub async fn create(&self, name: &str, content: Content) -> VaultResult<Deliverable> {
        if name.trim().is_empty() {
            return Err(VaultError::User("deliverable name must not be empty".to_string()));
        }
        content.ensure_within(self.inner.max_content_bytes)?;

        let record = self.inner.store.insert_deliverable(name.trim(), content).await?;
        info!("Created deliverable {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Replace the content of a draft deliverable
    pub async fn update_content(&self, id: DeliverableId, content: Content) -> VaultResult<Deliverable> {
        content.ensure_within(self.inner.max_content_bytes)?;
        let inner = Arc::clone(&self.inner);
        run_to_completion(async move { inner.update_content(id, content).await }).await
    }

    /// Draft -> Optimized
    pub async fn mark_optimized(&self, id: DeliverableId) -> VaultResult<OptimizeOutcome> {
        let inner = Arc::clone(&self.inner);
        run_to_completion(async move { inner.mark_optimized(id).await }).await
    }

    /// Optimized -> Locked, exporting the frozen content
    pub async fn lock(&self, id: DeliverableId) -> VaultResult<LockOutcome> {
        let inner = Arc::clone(&self.inner);
        run_to_completion(async move { inner.lock(id).await }).await
    }

    /// Locked -> Optimized; requires administrator credentials
    pub async fn unlock(
        &self,
        id: DeliverableId,
        credentials: &Credentials,
    ) -> VaultResult<UnlockOutcome> {
        let inner = Arc::clone(&self.inner);
        let credentials = credentials.clone();
        run_to_completion(async move { inner.unlock(id, &credentials).await }).await
    }

    /// Read-through lookup of a single deliverable
    pub async fn read(&self, id: DeliverableId) -> VaultResult<Fetched> {
        if let Some(entry) = self.inner.cache.get(id) {
            debug!("Cache hit for deliverable {}", id);
            return Ok(Fetched {
                deliverable: entry.deliverable,
                source: ReadSource::Cache,
            });
        }

        let epoch = self.inner.unlock_epoch.load(Ordering::SeqCst);
        let record = self
            .inner
            .store
            .get_deliverable(id)
            .await?
            .ok_or(VaultError::NotFound(id))?;

        self.inner.cache_if_current(&record, epoch).await;
        Ok(Fetched {
            deliverable: record,
            source: ReadSource::Store,
        })
    }

    /// Batched read-through lookup
    ///
    /// Results follow the order of `ids`; unknown ids map to `None`. Cache
    /// misses are fetched with a single store query.
    pub async fn batch_read(
        &self,
        ids: &[DeliverableId],
    ) -> VaultResult<Vec<(DeliverableId, Option<Fetched>)>> {
        let mut seen = HashSet::new();
        let unique: Vec<DeliverableId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut found: HashMap<DeliverableId, Fetched> = HashMap::new();
        let mut misses = vec![];
        for (id, entry) in self.inner.cache.get_multiple(&unique) {
            match entry {
                Some(entry) => {
                    found.insert(
                        id,
                        Fetched {
                            deliverable: entry.deliverable,
                            source: ReadSource::Cache,
                        },
                    );
                }
                None => misses.push(id),
            }
        }

        if !misses.is_empty() {
            let epoch = self.inner.unlock_epoch.load(Ordering::SeqCst);
            let loaded = self.inner.store.get_deliverables(&misses).await?;
            debug!(
                "Batch read: {} cached, {} requested from store, {} found",
                found.len(),
                misses.len(),
                loaded.len()
            );

            for record in loaded {
                self.inner.cache_if_current(&record, epoch).await;
                found.insert(
                    record.id,
                    Fetched {
                        deliverable: record,
                        source: ReadSource::Store,
                    },
                );
            }
        }

        Ok(ids.iter().map(|id| (*id, found.get(id).cloned())).collect())
    }

    /// All deliverables matching a flag filter, straight from the store
    pub async fn list(&self, filter: &FlagFilter) -> VaultResult<Vec<Deliverable>> {
        self.inner.store.find_by_flags(filter).await
    }

    /// Warm the cache with locked deliverables
    ///
    /// Most recently locked deliverables win when there are more than the
    /// cache can hold. Failures are logged and leave the cache as it was.
    pub async fn preload(&self) -> usize {
        let capacity = self.inner.cache.capacity();
        if capacity == 0 {
            return 0;
        }

        let epoch = self.inner.unlock_epoch.load(Ordering::SeqCst);
        let mut locked = match self.inner.store.find_by_flags(&FlagFilter::locked()).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Cache preload failed, continuing with a cold cache: {}", e);
                return 0;
            }
        };

        locked.sort_by(|a, b| b.locked_at.cmp(&a.locked_at));
        locked.truncate(capacity);

        // Oldest first, so the newest locks end up most recently used
        let mut loaded = 0;
        for record in locked.iter().rev() {
            if self.inner.cache_if_current(record, epoch).await {
                loaded += 1;
            }
        }

        info!("Preloaded {} locked deliverable(s) into cache", loaded);
        loaded
    }

    /// Lock every optimized, unlocked deliverable
    ///
    /// One failing deliverable never stops the batch.
    pub async fn export_all_optimized(&self) -> VaultResult<ExportSummary> {
        self.export_all_optimized_with(|_, _, _| {}).await
    }

    /// Like [`export_all_optimized`](Self::export_all_optimized), calling
    /// `on_item(done, total, id)` after each deliverable
    pub async fn export_all_optimized_with<F>(&self, mut on_item: F) -> VaultResult<ExportSummary>
    where
        F: FnMut(usize, usize, DeliverableId),
    {
        let candidates = self
            .inner
            .store
            .find_by_flags(&FlagFilter::ready_to_lock())
            .await?;

        let total = candidates.len();
        let mut summary = ExportSummary::default();
        for (done, candidate) in candidates.into_iter().enumerate() {
            match self.lock(candidate.id).await {
                Ok(LockOutcome::Locked { .. }) => summary.exported += 1,
                Ok(LockOutcome::AlreadyLocked { .. }) => summary.already_locked += 1,
                Err(e) => {
                    warn!("Export of deliverable {} failed: {}", candidate.id, e);
                    summary.errors.push((candidate.id, e.to_string()));
                }
            }
            on_item(done + 1, total, candidate.id);
        }

        info!(
            "Batch export finished: {} exported, {} failed",
            summary.exported,
            summary.errors.len()
        );
        Ok(summary)
    }

    /// Cache size and counters
    pub fn stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Drop all cached state
    pub fn shutdown(&self) {
        self.inner.cache.clear();
        debug!("Lock manager shut down, cache cleared");
    }
}

impl Inner {
    /// Serialize state changes per deliverable
    async fn acquire(&self, id: DeliverableId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop slots nobody holds or waits on
            guards.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(guards.entry(id).or_default())
        };
        slot.lock_owned().await
    }

    async fn load(&self, id: DeliverableId) -> VaultResult<Deliverable> {
        self.store
            .get_deliverable(id)
            .await?
            .ok_or(VaultError::NotFound(id))
    }

    /// Cache a record loaded outside the per-id lock
    ///
    /// Only locked records are cached, and only if no unlock happened since
    /// `epoch` was sampled (the record might be stale otherwise).
    async fn cache_if_current(&self, record: &Deliverable, epoch: u64) -> bool {
        if !record.is_locked {
            return false;
        }

        let _guard = self.acquire(record.id).await;
        if self.unlock_epoch.load(Ordering::SeqCst) != epoch {
            debug!("Skipping cache fill for {}: unlock in flight", record.id);
            return false;
        }

        self.cache.put(record.id, CachedEntry::new(record.clone()));
        true
    }

    async fn update_content(&self, id: DeliverableId, content: Content) -> VaultResult<Deliverable> {
        let _guard = self.acquire(id).await;
        let record = self.load(id).await?;

        if record.is_locked {
            return Err(VaultError::PreconditionFailed(format!(
                "deliverable {} is locked",
                id
            )));
        }
        if record.is_optimized {
            return Err(VaultError::PreconditionFailed(format!(
                "deliverable {} is optimized; its content is frozen",
                id
            )));
        }

        let updated = self
            .store
            .update_deliverable(id, &DeliverableUpdate::content(content))
            .await?;
        debug!("Updated content of deliverable {}", id);
        Ok(updated)
    }

    async fn mark_optimized(&self, id: DeliverableId) -> VaultResult<OptimizeOutcome> {
        let _guard = self.acquire(id).await;
        let record = self.load(id).await?;

        if record.is_optimized {
            self.cache.update(id, &CachePatch::optimized());
            return Ok(OptimizeOutcome::AlreadyOptimized);
        }

        self.store
            .update_deliverable(id, &DeliverableUpdate::optimized())
            .await?;
        // Should never be cached while unlocked, but keep any entry honest
        self.cache.update(id, &CachePatch::optimized());

        self.audit
            .log("deliverable.optimized", &json!({ "id": id, "name": record.name }))
            .await;
        info!("Deliverable {} marked optimized", id);
        Ok(OptimizeOutcome::Optimized)
    }

    async fn lock(&self, id: DeliverableId) -> VaultResult<LockOutcome> {
        let _guard = self.acquire(id).await;
        let record = self.load(id).await?;

        if !record.is_optimized {
            return Err(VaultError::PreconditionFailed(format!(
                "deliverable {} is not optimized",
                id
            )));
        }

        if record.is_locked {
            debug!("Deliverable {} already locked", id);
            return Ok(LockOutcome::AlreadyLocked {
                exported_path: record.exported_path,
                locked_at: record.locked_at,
            });
        }

        // Export failure leaves the store untouched
        let exported_path = self.exporter.export(&record).await?;
        let locked_at = Utc::now();

        let updated = match self
            .store
            .update_deliverable(id, &DeliverableUpdate::locked(locked_at, exported_path.clone()))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                warn!(
                    "Lock of deliverable {} failed after export; artifact {} is unreferenced: {}",
                    id,
                    exported_path.display(),
                    e
                );
                return Err(e);
            }
        };

        self.cache.put(id, CachedEntry::new(updated));

        self.audit
            .log(
                "deliverable.locked",
                &json!({
                    "id": id,
                    "name": record.name,
                    "exported_path": exported_path,
                    "locked_at": locked_at.to_rfc3339(),
                }),
            )
            .await;
        info!("Locked deliverable {} -> {}", id, exported_path.display());

        Ok(LockOutcome::Locked {
            exported_path,
            locked_at,
        })
    }

    /// Check credentials against an admin-role principal
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    async fn authorize(&self, id: DeliverableId, credentials: &Credentials) -> VaultResult<()> {
        let admin = match self.store.get_administrator(&credentials.username).await {
            Ok(admin) => admin,
            Err(VaultError::User(reason)) => {
                debug!("Principal lookup rejected: {}", reason);
                None
            }
            Err(e) => return Err(e),
        };

        let verified = match &admin {
            Some(admin) => verify_password(&credentials.password, &admin.password_hash),
            None => {
                debug!("Unlock requested by unknown principal");
                false
            }
        };

        if !verified {
            self.audit
                .log(
                    "deliverable.unlock_denied",
                    &json!({ "id": id, "username": credentials.username }),
                )
                .await;
            warn!("Denied unlock of deliverable {}", id);
            return Err(VaultError::Unauthorized);
        }

        Ok(())
    }

    async fn unlock(&self, id: DeliverableId, credentials: &Credentials) -> VaultResult<UnlockOutcome> {
        self.authorize(id, credentials).await?;

        let _guard = self.acquire(id).await;
        let record = self.load(id).await?;

        if !record.is_locked {
            self.cache.invalidate(id);
            return Ok(UnlockOutcome::NotLocked);
        }

        let result = self
            .store
            .update_deliverable(id, &DeliverableUpdate::unlocked())
            .await;

        self.unlock_epoch.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(id);
        result?;

        self.audit
            .log(
                "deliverable.unlocked",
                &json!({
                    "id": id,
                    "username": credentials.username,
                    "previous_export": record.exported_path,
                }),
            )
            .await;
        info!("Unlocked deliverable {} (by {})", id, credentials.username);
        Ok(UnlockOutcome::Unlocked)
    }
}
