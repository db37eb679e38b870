//! Create command - add a draft deliverable

use super::read_content;
use crate::cli::args::CreateArgs;
use crate::error::VaultResult;
use crate::lock::LockManager;
use crate::ui::{self, UiContext};

/// Execute the create command
pub async fn execute(args: CreateArgs, manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();
    let content = read_content(&args.source).await?;
    let record = manager.create(&args.name, content).await?;

    ui::step_ok_detail(
        &ctx,
        &format!("Created deliverable {}", record.id),
        &record.name,
    );
    Ok(())
}
