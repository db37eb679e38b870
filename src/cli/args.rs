//! CLI argument definitions using clap derive

use crate::store::{DeliverableId, FlagFilter};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lock, export and cache finalized business deliverables
///
/// Locks optimized deliverables, exports them to immutable checksummed
/// artifacts, and serves locked content from a bounded cache.
#[derive(Parser, Debug)]
#[command(name = "dlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DLOCK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a draft deliverable
    Create(CreateArgs),

    /// Replace the content of a draft deliverable
    Edit(EditArgs),

    /// Show one or more deliverables
    Show(ShowArgs),

    /// List deliverables
    List(ListArgs),

    /// Mark a deliverable as optimized
    Optimize(IdArgs),

    /// Lock an optimized deliverable and export it
    Lock(IdArgs),

    /// Unlock a locked deliverable (administrator only)
    Unlock(UnlockArgs),

    /// Lock and export every optimized deliverable
    ExportAll,

    /// Verify the checksum of an export artifact
    Verify(VerifyArgs),

    /// Show cache statistics
    Stats(StatsArgs),

    /// Manage administrator accounts
    Admin(AdminArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Content given inline or read from a file
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ContentSource {
    /// Content as a JSON document
    #[arg(long)]
    pub content: Option<String>,

    /// Read JSON content from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the create command
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Deliverable name
    pub name: String,

    #[command(flatten)]
    pub source: ContentSource,
}

/// Arguments for the edit command
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Deliverable ID
    pub id: DeliverableId,

    #[command(flatten)]
    pub source: ContentSource,
}

/// A single deliverable ID
#[derive(Parser, Debug)]
pub struct IdArgs {
    /// Deliverable ID
    pub id: DeliverableId,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Deliverable IDs
    #[arg(required = true)]
    pub ids: Vec<DeliverableId>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only deliverables in this state
    #[arg(short, long, value_enum)]
    pub state: Option<StateFilter>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the unlock command
#[derive(Parser, Debug)]
pub struct UnlockArgs {
    /// Deliverable ID
    pub id: DeliverableId,

    /// Administrator username
    #[arg(short, long, default_value = "admin")]
    pub username: String,

    /// Administrator password (prompted for when omitted)
    #[arg(long, env = "DLOCK_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Path to an export artifact
    pub path: PathBuf,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the admin command
#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

/// Admin subcommands
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create or replace an account
    Add {
        /// Account username
        username: String,

        /// Account password (prompted for when omitted)
        #[arg(long, env = "DLOCK_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Create a staff account, which cannot unlock
        #[arg(long)]
        staff: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Lifecycle filter for the list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    Draft,
    Optimized,
    Locked,
}

impl From<StateFilter> for FlagFilter {
    fn from(state: StateFilter) -> Self {
        match state {
            StateFilter::Draft => FlagFilter::drafts(),
            StateFilter::Optimized => FlagFilter::ready_to_lock(),
            StateFilter::Locked => FlagFilter::locked(),
        }
    }
}

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_unlock_defaults_username() {
        let cli = Cli::try_parse_from(["dlock", "unlock", "7", "--password", "pw"]).unwrap();
        match cli.command {
            Commands::Unlock(args) => {
                assert_eq!(args.id, DeliverableId(7));
                assert_eq!(args.username, "admin");
                assert_eq!(args.password.as_deref(), Some("pw"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_create_requires_one_content_source() {
        assert!(Cli::try_parse_from(["dlock", "create", "Plan"]).is_err());
        assert!(Cli::try_parse_from([
            "dlock", "create", "Plan", "--content", "{}", "--file", "plan.json"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["dlock", "create", "Plan", "--content", "{}"]).is_ok());
    }

    #[test]
    fn parse_show_multiple_ids() {
        let cli = Cli::try_parse_from(["dlock", "show", "1", "2", "3", "-f", "json"]).unwrap();
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.ids, vec![DeliverableId(1), DeliverableId(2), DeliverableId(3)]);
                assert!(matches!(args.format, OutputFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["dlock", "lock", "abc"]).is_err());
    }

    #[test]
    fn parse_list_state_filter() {
        let cli = Cli::try_parse_from(["dlock", "list", "--state", "locked"]).unwrap();
        match cli.command {
            Commands::List(args) => assert_eq!(args.state, Some(StateFilter::Locked)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_verbose_count() {
        let cli = Cli::try_parse_from(["dlock", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
