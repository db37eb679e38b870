//! List command - deliverables by lifecycle state

use crate::cli::args::{ListArgs, OutputFormat};
use crate::error::VaultResult;
use crate::lock::LockManager;
use crate::store::{Deliverable, DeliverableState, FlagFilter};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, manager: &LockManager) -> VaultResult<()> {
    let filter = args.state.map(FlagFilter::from).unwrap_or_else(FlagFilter::all);
    let deliverables = manager.list(&filter).await?;

    if deliverables.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No deliverables");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&deliverables),
        OutputFormat::Json => print_json(&deliverables)?,
        OutputFormat::Plain => print_plain(&deliverables),
    }

    Ok(())
}

fn print_table(deliverables: &[Deliverable]) {
    println!(
        "{:<8} {:<10} {:<32} {:<25}",
        style("ID").bold(),
        style("STATE").bold(),
        style("NAME").bold(),
        style("LOCKED AT").bold()
    );
    println!("{}", "-".repeat(78));

    for d in deliverables {
        let state = match d.state() {
            DeliverableState::Locked => style("locked").green(),
            DeliverableState::Optimized => style("optimized").cyan(),
            DeliverableState::Draft => style("draft").dim(),
        };
        let locked_at = d
            .locked_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<10} {:<32} {:<25}",
            d.id,
            state,
            truncate(&d.name, 32),
            locked_at
        );
    }
}

fn print_json(deliverables: &[Deliverable]) -> VaultResult<()> {
    println!("{}", serde_json::to_string_pretty(deliverables)?);
    Ok(())
}

fn print_plain(deliverables: &[Deliverable]) {
    for d in deliverables {
        println!("{}\t{}\t{}", d.id, d.state(), d.name);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
