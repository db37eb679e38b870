//! Lock lifecycle management

pub mod credential;
pub mod factory;
pub mod manager;
pub mod outcome;

pub use credential::{hash_password, verify_password, Credentials};
pub use factory::open_manager;
pub use manager::{LockManager, LockManagerBuilder};
pub use outcome::{ExportSummary, Fetched, LockOutcome, OptimizeOutcome, ReadSource, UnlockOutcome};
