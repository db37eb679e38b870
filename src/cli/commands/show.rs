//! Show command - read deliverables through the cache

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::error::{VaultError, VaultResult};
use crate::lock::{Fetched, LockManager, ReadSource};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the show command
pub async fn execute(args: ShowArgs, manager: &LockManager) -> VaultResult<()> {
    let results = manager.batch_read(&args.ids).await?;

    let mut missing = vec![];
    let mut found = vec![];
    for (id, fetched) in results {
        match fetched {
            Some(fetched) => found.push(fetched),
            None => missing.push(id),
        }
    }

    match args.format {
        OutputFormat::Table => print_table(&found)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        OutputFormat::Plain => {
            for fetched in &found {
                println!("{}", serde_json::to_string(&fetched.deliverable.content)?);
            }
        }
    }

    match missing.first() {
        Some(id) => Err(VaultError::NotFound(*id)),
        None => Ok(()),
    }
}

fn print_table(found: &[Fetched]) -> VaultResult<()> {
    let ctx = UiContext::detect();

    for fetched in found {
        let d = &fetched.deliverable;
        ui::section(&ctx, &format!("Deliverable {}: {}", d.id, d.name));
        ui::key_value(&ctx, "state", &d.state().to_string());
        if let Some(locked_at) = d.locked_at {
            ui::key_value(&ctx, "locked at", &locked_at.to_rfc3339());
        }
        if let Some(ref path) = d.exported_path {
            ui::key_value(&ctx, "export", &path.display().to_string());
        }
        let source = match fetched.source {
            ReadSource::Cache => style("cache").green(),
            ReadSource::Store => style("store").dim(),
        };
        ui::key_value(&ctx, "served from", &source.to_string());
        ui::key_value(&ctx, "updated", &d.updated_at.to_rfc3339());
        println!("{}", serde_json::to_string_pretty(&d.content)?);
    }
    Ok(())
}
