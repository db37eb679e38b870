//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{VaultError, VaultResult};

/// Prompt for a secret
///
/// Returns `None` when no terminal is available to ask on.
pub async fn password(ctx: &UiContext, message: &str) -> VaultResult<Option<String>> {
    if !ctx.is_interactive() {
        return Ok(None);
    }

    // Run blocking cliclack prompt in spawn_blocking
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::password(&message).mask('▪').interact()
    })
    .await
    .map_err(|e| VaultError::User(format!("Prompt task failed: {}", e)))?;

    result
        .map(Some)
        .map_err(|e| VaultError::User(format!("Prompt failed: {}", e)))
}
