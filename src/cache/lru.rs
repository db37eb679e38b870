//! Bounded LRU cache with per-entry TTL

use crate::cache::entry::{CachePatch, CachedEntry};
use crate::store::DeliverableId;
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default maximum number of entries
pub const DEFAULT_CAPACITY: usize = 100;

/// Default time-to-live of an untouched entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    /// `size / capacity`, 0.0 when caching is disabled
    pub utilization: f64,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug)]
struct Slot {
    entry: CachedEntry,
    tick: u64,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<DeliverableId, Slot>,
    /// Recency order: smallest tick is least recently used
    recency: BTreeMap<u64, DeliverableId>,
    next_tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    /// Move `id` to the most-recent position and push its expiry out
    fn touch(&mut self, id: DeliverableId, expires_at: Instant) {
        let tick = self.bump();
        if let Some(slot) = self.slots.get_mut(&id) {
            self.recency.remove(&slot.tick);
            slot.tick = tick;
            slot.expires_at = expires_at;
            self.recency.insert(tick, id);
        }
    }

    fn remove(&mut self, id: DeliverableId) -> Option<Slot> {
        let slot = self.slots.remove(&id)?;
        self.recency.remove(&slot.tick);
        Some(slot)
    }

    fn expired(&self, id: DeliverableId, now: Instant) -> bool {
        self.slots.get(&id).is_some_and(|s| s.expires_at <= now)
    }

    fn evict_lru(&mut self) -> Option<DeliverableId> {
        let (_, id) = self.recency.pop_first()?;
        self.slots.remove(&id);
        self.evictions += 1;
        Some(id)
    }
}

/// In-memory cache of locked deliverables
///
/// Every operation is infallible from the caller's point of view. A poisoned
/// internal lock is recovered rather than propagated, since the cache can
/// always be rebuilt from the store.
#[derive(Debug)]
pub struct ArtifactCache {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl ArtifactCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry, refreshing its recency and TTL
    pub fn get(&self, id: DeliverableId) -> Option<CachedEntry> {
        let now = Instant::now();
        let mut inner = self.lock();

        if inner.expired(id, now) {
            inner.remove(id);
            inner.expirations += 1;
            inner.misses += 1;
            debug!("Cache entry {} expired", id);
            return None;
        }

        if !inner.slots.contains_key(&id) {
            inner.misses += 1;
            return None;
        }

        inner.touch(id, now + self.ttl);
        inner.hits += 1;
        inner.slots.get(&id).map(|s| s.entry.clone())
    }

    /// Insert or replace an entry, evicting the least recently used on overflow
    pub fn put(&self, id: DeliverableId, mut entry: CachedEntry) {
        if self.capacity == 0 {
            return;
        }

        let now = Instant::now();
        entry.cached_at = Utc::now();

        let mut inner = self.lock();
        inner.remove(id);

        let tick = inner.bump();
        inner.slots.insert(
            id,
            Slot {
                entry,
                tick,
                expires_at: now + self.ttl,
            },
        );
        inner.recency.insert(tick, id);

        while inner.slots.len() > self.capacity {
            if let Some(evicted) = inner.evict_lru() {
                debug!("Evicted deliverable {} from cache", evicted);
            }
        }
    }

    /// Merge fields into an existing entry
    ///
    /// Absent (or expired) entries are left absent: an update never creates
    /// an entry. A patch that would unlock the entry drops it instead.
    pub fn update(&self, id: DeliverableId, patch: &CachePatch) {
        let now = Instant::now();
        let mut inner = self.lock();

        if inner.expired(id, now) {
            inner.remove(id);
            inner.expirations += 1;
            return;
        }

        if patch.unlocks() {
            inner.remove(id);
            return;
        }

        let Some(slot) = inner.slots.get_mut(&id) else {
            return;
        };
        patch.apply_to(&mut slot.entry.deliverable);
        slot.entry.cached_at = Utc::now();
        inner.touch(id, now + self.ttl);
    }

    /// Drop an entry if present
    pub fn invalidate(&self, id: DeliverableId) {
        if self.lock().remove(id).is_some() {
            debug!("Invalidated cache entry {}", id);
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.slots.clear();
        inner.recency.clear();
    }

    /// Look up several ids at once; misses map to `None`
    pub fn get_multiple(&self, ids: &[DeliverableId]) -> HashMap<DeliverableId, Option<CachedEntry>> {
        ids.iter().map(|id| (*id, self.get(*id))).collect()
    }

    /// Drop all expired entries and return how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let expired: Vec<DeliverableId> = inner
            .slots
            .iter()
            .filter(|(_, slot)| slot.expires_at <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            inner.remove(*id);
        }
        inner.expirations += expired.len() as u64;
        expired.len()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.purge_expired();
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current size, capacity and counters
    pub fn stats(&self) -> CacheStats {
        self.purge_expired();
        let inner = self.lock();
        let size = inner.slots.len();
        let utilization = if self.capacity == 0 {
            0.0
        } else {
            size as f64 / self.capacity as f64
        };

        CacheStats {
            size,
            capacity: self.capacity,
            utilization,
            ttl_secs: self.ttl.as_secs(),
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            expirations: inner.expirations,
        }
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
