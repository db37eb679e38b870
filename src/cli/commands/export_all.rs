//! Export-all command - lock every optimized deliverable

use crate::error::{VaultError, VaultResult};
use crate::lock::LockManager;
use crate::ui::{self, BatchProgress, UiContext};

/// Execute the export-all command
pub async fn execute(manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();
    let progress = BatchProgress::new(&ctx, "Exporting");

    let result = manager
        .export_all_optimized_with(|done, total, id| {
            progress.advance(done, total, &format!("deliverable {}", id));
        })
        .await;
    progress.finish();
    let summary = result?;

    ui::section(&ctx, "Export summary");
    ui::key_value(&ctx, "exported", &summary.exported.to_string());
    ui::key_value(&ctx, "already locked", &summary.already_locked.to_string());
    for (id, reason) in &summary.errors {
        ui::step_error_detail(&ctx, &format!("Deliverable {}", id), reason);
    }

    if summary.is_clean() {
        if summary.exported == 0 && summary.already_locked == 0 {
            ui::step_info(&ctx, "No optimized deliverables awaiting export");
        }
        Ok(())
    } else {
        Err(VaultError::User(format!(
            "{} deliverable(s) failed to export",
            summary.errors.len()
        )))
    }
}
