//! Optimize command - mark a draft as optimized

use crate::cli::args::IdArgs;
use crate::error::VaultResult;
use crate::lock::{LockManager, OptimizeOutcome};
use crate::ui::{self, UiContext};

/// Execute the optimize command
pub async fn execute(args: IdArgs, manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();

    match manager.mark_optimized(args.id).await? {
        OptimizeOutcome::Optimized => {
            ui::step_ok(&ctx, &format!("Deliverable {} marked optimized", args.id));
        }
        OptimizeOutcome::AlreadyOptimized => {
            ui::step_warn(&ctx, &format!("Deliverable {} is already optimized", args.id));
        }
    }
    Ok(())
}
