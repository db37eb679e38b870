//! Verify command - check an export artifact's checksum

use crate::cli::args::VerifyArgs;
use crate::error::{VaultError, VaultResult};
use crate::export::ArtifactExporter;
use crate::ui::{self, UiContext};

/// Execute the verify command
pub async fn execute(args: VerifyArgs) -> VaultResult<()> {
    let ctx = UiContext::detect();
    let verification = ArtifactExporter::verify(&args.path).await?;

    if verification.matches {
        ui::step_ok_detail(&ctx, "Checksum matches", &verification.actual);
        Ok(())
    } else {
        ui::step_error(&ctx, "Checksum mismatch");
        ui::key_value(&ctx, "expected", &verification.expected);
        ui::key_value(&ctx, "actual", &verification.actual);
        Err(VaultError::ArtifactInvalid {
            path: args.path,
            reason: "content does not match recorded checksum".to_string(),
        })
    }
}
