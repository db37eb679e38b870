//! In-memory cache of locked deliverables
//!
//! Holds hot copies of deliverables that are frozen, so reads of finalized
//! documents skip the store. The cache is derived state: losing it costs
//! latency, never correctness.
//!
//! # Invariant
//!
//! An entry exists only while the underlying deliverable is locked. Entries
//! are created by the lock manager (read-miss, lock write-through, preload)
//! and dropped on unlock, LRU eviction or TTL expiry.
//!
//! | Event | Effect |
//! |-------|--------|
//! | `get` hit | recency and TTL refreshed |
//! | `put` over capacity | least recently used entry evicted |
//! | TTL elapsed without touch | entry absent on next access |
//! | `update` on absent id | no-op |

pub mod entry;
pub mod lru;

pub use entry::{CachePatch, CachedEntry};
pub use lru::{ArtifactCache, CacheStats, DEFAULT_CAPACITY, DEFAULT_TTL};
