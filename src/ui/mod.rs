//! UI helpers for consistent CLI output
//!
//! Uses `cliclack` for interactive prompts and `indicatif` for batch progress,
//! with plain-text fallback in CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use dlock::ui::{self, UiContext, BatchProgress};
//!
//! let ctx = UiContext::detect();
//! let progress = BatchProgress::new(&ctx, "Exporting");
//! progress.advance(1, 3, "deliverable 7");
//! progress.finish();
//!
//! ui::step_ok_detail(&ctx, "Locked deliverable 7", "/exports/deliverable-7-....json");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    key_value, section, step_error, step_error_detail, step_info, step_ok, step_ok_detail,
    step_warn, step_warn_hint,
};
pub use progress::BatchProgress;
pub use prompts::password;
