//! Stats command - cache utilization and counters

use crate::cli::args::{OutputFormat, StatsArgs};
use crate::error::VaultResult;
use crate::lock::LockManager;
use crate::ui::{self, UiContext};

/// Execute the stats command
pub async fn execute(args: StatsArgs, manager: &LockManager) -> VaultResult<()> {
    let stats = manager.stats();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("size={}", stats.size);
            println!("capacity={}", stats.capacity);
            println!("utilization={:.2}", stats.utilization);
            println!("ttl_secs={}", stats.ttl_secs);
        }
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::section(&ctx, "Cache");
            ui::key_value(&ctx, "store", manager.store().backend_name());
            ui::key_value(&ctx, "size", &format!("{}/{}", stats.size, stats.capacity));
            ui::key_value(&ctx, "utilization", &format!("{:.1}%", stats.utilization * 100.0));
            ui::key_value(&ctx, "ttl", &format!("{}s", stats.ttl_secs));
            ui::key_value(&ctx, "hits", &stats.hits.to_string());
            ui::key_value(&ctx, "misses", &stats.misses.to_string());
            ui::key_value(&ctx, "evictions", &stats.evictions.to_string());
            ui::key_value(&ctx, "expirations", &stats.expirations.to_string());
        }
    }
    Ok(())
}
