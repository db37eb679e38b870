//! Lock command - freeze and export an optimized deliverable

use crate::cli::args::IdArgs;
use crate::error::VaultResult;
use crate::lock::{LockManager, LockOutcome};
use crate::ui::{self, UiContext};

/// Execute the lock command
pub async fn execute(args: IdArgs, manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();

    match manager.lock(args.id).await? {
        LockOutcome::Locked { exported_path, .. } => {
            ui::step_ok_detail(
                &ctx,
                &format!("Locked deliverable {}", args.id),
                &exported_path.display().to_string(),
            );
        }
        LockOutcome::AlreadyLocked { exported_path, .. } => {
            let detail = exported_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "no export recorded".to_string());
            ui::step_warn_hint(
                &ctx,
                &format!("Deliverable {} is already locked", args.id),
                &detail,
            );
        }
    }
    Ok(())
}
