//! CLI command implementations

pub mod admin;
pub mod config;
pub mod create;
pub mod edit;
pub mod export_all;
pub mod list;
pub mod lock;
pub mod optimize;
pub mod show;
pub mod stats;
pub mod unlock;
pub mod verify;

pub use admin::execute as admin;
pub use config::execute as config;
pub use create::execute as create;
pub use edit::execute as edit;
pub use export_all::execute as export_all;
pub use list::execute as list;
pub use lock::execute as lock;
pub use optimize::execute as optimize;
pub use show::execute as show;
pub use stats::execute as stats;
pub use unlock::execute as unlock;
pub use verify::execute as verify;

use crate::cli::args::ContentSource;
use crate::error::{VaultError, VaultResult};
use crate::store::Content;

/// Resolve `--content` / `--file` into parsed content
async fn read_content(source: &ContentSource) -> VaultResult<Content> {
    match (&source.content, &source.file) {
        (Some(raw), _) => Content::parse(raw),
        (None, Some(path)) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| VaultError::io(format!("reading {}", path.display()), e))?;
            Content::parse(&raw)
        }
        (None, None) => Err(VaultError::User(
            "provide content with --content or --file".to_string(),
        )),
    }
}
