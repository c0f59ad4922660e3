use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pausegate")]
#[command(version, about = "Pausegate - Human approval gates and history compaction for agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to ~/.local/share/pausegate/pausegate.db)
    #[arg(long, global = true, env = "PAUSEGATE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Config file path (defaults to ~/.config/pausegate/config.toml)
    #[arg(long, global = true, env = "PAUSEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Submit an action for approval
    Submit(SubmitArgs),

    /// List outstanding approvals
    Pending,

    /// Approve a pending action
    Approve {
        /// Resume token
        token: String,
    },

    /// Reject a pending action
    Reject {
        /// Resume token
        token: String,

        /// Reason shown to the agent
        #[arg(long)]
        reason: Option<String>,
    },

    /// Expire stale approvals
    Sweep {
        /// Staleness timeout (defaults to the configured timeout)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// List resolved and expired approvals
    History,

    /// Replay a transcript through history compaction
    Compact {
        /// JSON file holding an array of {author, content} turns
        transcript: PathBuf,
    },
}

#[derive(Args)]
pub struct SubmitArgs {
    /// Action identifier
    pub action_id: String,

    /// Action parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Parameter shown to the approver (repeatable)
    #[arg(short = 't', long = "threshold-field", value_name = "FIELD")]
    pub threshold_fields: Vec<String>,

    /// Custom hint shown to the approver
    #[arg(long)]
    pub hint: Option<String>,

    /// Always wait for a human, ignoring the configured rule
    #[arg(long)]
    pub require_approval: bool,
}
