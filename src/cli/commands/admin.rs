//! Admin command - manage principals allowed to unlock

use crate::cli::args::{AdminAction, AdminArgs};
use crate::error::{VaultError, VaultResult};
use crate::lock::{hash_password, LockManager};
use crate::store::{Administrator, Role};
use crate::ui::{self, UiContext};

/// Execute the admin command
pub async fn execute(args: AdminArgs, manager: &LockManager) -> VaultResult<()> {
    match args.action {
        AdminAction::Add {
            username,
            password,
            staff,
        } => add(manager, username, password, staff).await,
    }
}

async fn add(
    manager: &LockManager,
    username: String,
    password: Option<String>,
    staff: bool,
) -> VaultResult<()> {
    let ctx = UiContext::detect();

    let password = match password {
        Some(password) => password,
        None => ui::password(&ctx, &format!("New password for {}", username))
            .await?
            .ok_or_else(|| {
                VaultError::User(
                    "no password given; use --password or DLOCK_ADMIN_PASSWORD".to_string(),
                )
            })?,
    };
    if password.is_empty() {
        return Err(VaultError::User("password must not be empty".to_string()));
    }

    let role = if staff { Role::Staff } else { Role::Admin };
    // Hashing is CPU-bound
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| VaultError::Internal(format!("hashing task failed: {}", e)))?;

    let record = Administrator::new(username, role, hash);
    manager.store().put_administrator(&record).await?;

    let role_name = match role {
        Role::Admin => "admin",
        Role::Staff => "staff",
    };
    ui::step_ok_detail(&ctx, &format!("Saved account {}", record.username), role_name);
    Ok(())
}
