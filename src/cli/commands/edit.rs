//! Edit command - replace draft content

use super::read_content;
use crate::cli::args::EditArgs;
use crate::error::VaultResult;
use crate::lock::LockManager;
use crate::ui::{self, UiContext};

/// Execute the edit command
pub async fn execute(args: EditArgs, manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();
    let content = read_content(&args.source).await?;
    let record = manager.update_content(args.id, content).await?;

    ui::step_ok(&ctx, &format!("Updated content of deliverable {}", record.id));
    Ok(())
}
