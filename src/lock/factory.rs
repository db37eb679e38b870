//! Wiring a lock manager from configuration
//!
//! Builds the file-backed store, exporter and cache described by `Config`
//! and optionally warms the cache.

use crate::audit::AuditLog;
use crate::cache::ArtifactCache;
use crate::config::{Config, ConfigManager};
use crate::error::VaultResult;
use crate::export::ArtifactExporter;
use crate::lock::manager::LockManager;
use crate::store::JsonFileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Open the configured store and build a ready-to-use manager
///
/// Preload failures never fail startup; the manager just starts cold.
pub async fn open_manager(config: &Config) -> VaultResult<LockManager> {
    let store_dir = config
        .store
        .dir
        .clone()
        .unwrap_or_else(ConfigManager::store_dir);
    let export_dir = config
        .export
        .dir
        .clone()
        .unwrap_or_else(ConfigManager::exports_dir);

    let store = JsonFileStore::open(&store_dir).await?;
    let cache = ArtifactCache::new(
        config.cache.capacity,
        Duration::from_secs(config.cache.ttl_secs),
    );
    debug!(
        "Store at {}, exports to {}, cache capacity {}",
        store_dir.display(),
        export_dir.display(),
        config.cache.capacity
    );

    let manager = LockManager::builder(
        Arc::new(store),
        ArtifactExporter::new(export_dir),
        Arc::new(cache),
    )
    .audit(AuditLog::new(config))
    .max_content_bytes(config.content.max_bytes)
    .build();

    if config.cache.preload {
        manager.preload().await;
    }

    Ok(manager)
}
