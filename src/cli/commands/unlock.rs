//! Unlock command - administrator-gated release of a lock

use crate::cli::args::UnlockArgs;
use crate::error::{VaultError, VaultResult};
use crate::lock::{Credentials, LockManager, UnlockOutcome};
use crate::ui::{self, UiContext};

/// Execute the unlock command
pub async fn execute(args: UnlockArgs, manager: &LockManager) -> VaultResult<()> {
    let ctx = UiContext::detect();

    let password = match args.password {
        Some(password) => password,
        None => ui::password(&ctx, &format!("Password for {}", args.username))
            .await?
            .ok_or_else(|| {
                VaultError::User(
                    "no password given; use --password or DLOCK_ADMIN_PASSWORD".to_string(),
                )
            })?,
    };

    let credentials = Credentials::new(args.username, password);
    match manager.unlock(args.id, &credentials).await? {
        UnlockOutcome::Unlocked => {
            ui::step_ok(&ctx, &format!("Unlocked deliverable {}", args.id));
        }
        UnlockOutcome::NotLocked => {
            ui::step_warn(&ctx, &format!("Deliverable {} is not locked", args.id));
        }
    }
    Ok(())
}
