//! dlock - deliverable lock and cache
//!
//! Freezes optimized deliverables, exports each lock event to an immutable
//! checksummed artifact, and serves locked content from a bounded in-memory
//! cache. Unlocking requires administrator credentials.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod lock;
pub mod store;
pub mod ui;

pub use error::{VaultError, VaultResult};
