mod cli;
mod commands;
mod completions;
mod error;
mod output;
mod setup;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use pausegate_core::Decision;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    if let Commands::Completions { shell } = cli.command {
        completions::generate_completions(shell);
        return Ok(());
    }

    let config = setup::load_config(cli.config.as_deref())?;

    if let Commands::Compact { transcript } = &cli.command {
        return commands::compact::run(transcript, &config, format);
    }

    let db_path = setup::resolve_db_path(cli.db_path, &config)?;
    let service = setup::prepare_service(&db_path)?;

    match cli.command {
        Commands::Submit(args) => commands::approval::submit(&service, &config, args, format).await,
        Commands::Pending => commands::approval::list_pending(&service, format).await,
        Commands::Approve { token } => {
            commands::approval::resolve(&service, token, Decision::Approve, format).await
        }
        Commands::Reject { token, reason } => {
            commands::approval::resolve(&service, token, Decision::Reject { reason }, format).await
        }
        Commands::Sweep { timeout_secs } => {
            commands::approval::sweep(&service, &config, timeout_secs, format).await
        }
        Commands::History => commands::approval::history(&service, format).await,
        Commands::Completions { .. } | Commands::Compact { .. } => Ok(()),
    }
}
