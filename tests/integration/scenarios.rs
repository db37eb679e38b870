//! Library-level lock and cache scenarios against the in-memory store

use dlock::cache::ArtifactCache;
use dlock::export::ArtifactExporter;
use dlock::lock::credential::hash_password_with;
use dlock::lock::{Credentials, LockManager, LockOutcome, ReadSource, UnlockOutcome};
use dlock::store::{
    Administrator, Content, Deliverable, DeliverableId, MemoryStore, PersistentStore, Role,
};
use dlock::VaultError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Harness {
    store: Arc<MemoryStore>,
    manager: LockManager,
    _exports: TempDir,
}

async fn harness() -> Harness {
    let exports = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    store
        .put_administrator(&Administrator::new(
            "admin",
            Role::Admin,
            hash_password_with("correctpassword", 1),
        ))
        .await
        .unwrap();

    let manager = LockManager::new(
        store.clone(),
        ArtifactExporter::new(exports.path()),
        Arc::new(ArtifactCache::new(10, Duration::from_secs(3600))),
    );
    Harness {
        store,
        manager,
        _exports: exports,
    }
}

async fn seed(store: &MemoryStore, id: i64, optimized: bool) {
    let mut record = Deliverable::new(
        DeliverableId(id),
        format!("Deliverable {}", id),
        Content::new(json!({"sections": ["summary", "plan"], "id": id})),
    );
    record.is_optimized = optimized;
    store.seed(record).await;
}

const ID: DeliverableId = DeliverableId(42);

#[tokio::test]
async fn scenario_a_lock_requires_optimized() {
    let h = harness().await;
    seed(&h.store, 42, false).await;

    let err = h.manager.lock(ID).await.unwrap_err();
    assert!(matches!(err, VaultError::PreconditionFailed(_)));
    assert_eq!(h.manager.exporter().exports_written(), 0);
    assert!(h.manager.cache().get(ID).is_none());
}

#[tokio::test]
async fn scenarios_b_through_e_lock_lifecycle() {
    let h = harness().await;
    seed(&h.store, 42, true).await;

    // B: lock exports, persists and caches
    let outcome = h.manager.lock(ID).await.unwrap();
    let path = outcome.exported_path().unwrap().to_path_buf();
    assert!(outcome.is_new_lock());
    assert!(path.exists());

    let stored = h.store.get_deliverable(ID).await.unwrap().unwrap();
    assert!(stored.is_locked);
    assert_eq!(stored.exported_path.as_deref(), Some(path.as_path()));
    let cached = h.manager.cache().get(ID).unwrap();
    assert_eq!(cached.deliverable.exported_path.as_deref(), Some(path.as_path()));

    // C: relock is idempotent
    let again = h.manager.lock(ID).await.unwrap();
    assert!(matches!(again, LockOutcome::AlreadyLocked { .. }));
    assert_eq!(again.exported_path(), Some(path.as_path()));
    assert_eq!(h.manager.exporter().exports_written(), 1);

    // D: wrong password changes nothing
    let err = h
        .manager
        .unlock(ID, &Credentials::new("admin", "wrongpassword"))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Unauthorized));
    assert!(h.store.get_deliverable(ID).await.unwrap().unwrap().is_locked);
    assert!(h.manager.cache().get(ID).is_some());

    // E: correct password unlocks and evicts
    let outcome = h
        .manager
        .unlock(ID, &Credentials::new("admin", "correctpassword"))
        .await
        .unwrap();
    assert_eq!(outcome, UnlockOutcome::Unlocked);
    let stored = h.store.get_deliverable(ID).await.unwrap().unwrap();
    assert!(!stored.is_locked);
    assert!(stored.is_optimized);
    assert!(stored.locked_at.is_none());
    assert!(stored.exported_path.is_none());
    assert!(h.manager.cache().get(ID).is_none());

    // The artifact of the released lock stays on disk
    assert!(path.exists());
}

#[tokio::test]
async fn scenario_f_batch_read_mixes_cache_and_store() {
    let h = harness().await;
    seed(&h.store, 1, true).await;
    seed(&h.store, 2, true).await;
    h.manager.lock(DeliverableId(1)).await.unwrap();
    h.manager.lock(DeliverableId(2)).await.unwrap();
    h.manager.cache().invalidate(DeliverableId(2));

    let results = h
        .manager
        .batch_read(&[DeliverableId(1), DeliverableId(2), DeliverableId(3)])
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let (id, first) = &results[0];
    assert_eq!(*id, DeliverableId(1));
    assert_eq!(first.as_ref().unwrap().source, ReadSource::Cache);

    let (id, second) = &results[1];
    assert_eq!(*id, DeliverableId(2));
    assert_eq!(second.as_ref().unwrap().source, ReadSource::Store);
    assert!(h.manager.cache().get(DeliverableId(2)).is_some());

    let (id, third) = &results[2];
    assert_eq!(*id, DeliverableId(3));
    assert!(third.is_none());
}

#[tokio::test]
async fn relock_after_unlock_writes_new_artifact() {
    let h = harness().await;
    seed(&h.store, 42, true).await;

    let first = h.manager.lock(ID).await.unwrap();
    h.manager
        .unlock(ID, &Credentials::new("admin", "correctpassword"))
        .await
        .unwrap();
    let second = h.manager.lock(ID).await.unwrap();

    assert!(second.is_new_lock());
    assert_ne!(first.exported_path(), second.exported_path());
    assert_eq!(h.manager.exporter().exports_written(), 2);

    let check = ArtifactExporter::verify(second.exported_path().unwrap())
        .await
        .unwrap();
    assert!(check.matches);
}

#[tokio::test]
async fn unknown_principal_and_wrong_password_look_alike() {
    let h = harness().await;
    seed(&h.store, 42, true).await;
    h.manager.lock(ID).await.unwrap();

    let unknown = h
        .manager
        .unlock(ID, &Credentials::new("nobody", "correctpassword"))
        .await
        .unwrap_err();
    let wrong = h
        .manager
        .unlock(ID, &Credentials::new("admin", "nope"))
        .await
        .unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());
}
