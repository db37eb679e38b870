//! dlock - deliverable lock and cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use dlock::cli::{commands, Cli, Commands};
use dlock::config::{Config, ConfigManager};
use dlock::error::VaultResult;
use dlock::lock::open_manager;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            if e.is_retryable() {
                eprintln!(
                    "{} The deliverable was left unchanged; the command can be retried",
                    style("Note:").dim()
                );
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> VaultResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::locate(cli.config.clone());
    let config = config_manager.load().await?;

    init_tracing(cli.verbose, &config);

    // Commands that never touch the store
    let command = match cli.command {
        Commands::Config(args) => {
            return commands::config(args, &config, &config_manager).await;
        }
        Commands::Verify(args) => return commands::verify(args).await,
        other => other,
    };

    let manager = open_manager(&config).await?;
    let result = match command {
        Commands::Create(args) => commands::create(args, &manager).await,
        Commands::Edit(args) => commands::edit(args, &manager).await,
        Commands::Show(args) => commands::show(args, &manager).await,
        Commands::List(args) => commands::list(args, &manager).await,
        Commands::Optimize(args) => commands::optimize(args, &manager).await,
        Commands::Lock(args) => commands::lock(args, &manager).await,
        Commands::Unlock(args) => commands::unlock(args, &manager).await,
        Commands::ExportAll => commands::export_all(&manager).await,
        Commands::Stats(args) => commands::stats(args, &manager).await,
        Commands::Admin(args) => commands::admin(args, &manager).await,
        Commands::Config(_) | Commands::Verify(_) => unreachable!("handled above"),
    };
    manager.shutdown();
    result
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_tracing(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("dlock=warn"),
        1 => EnvFilter::new("dlock=info"),
        _ => EnvFilter::new("dlock=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
