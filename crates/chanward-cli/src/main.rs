//! `chanward` -- Slack channel lifecycle automation.
//!
//! Provides the following subcommands:
//!
//! - `chanward inactive` -- Warn idle channels, archive those whose warning
//!   went unanswered.
//! - `chanward detect` -- Announce newly created channels.
//!
//! Reports go to stdout, logs to stderr. Errors are printed with a
//! remediation hint and a non-zero exit code.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use chanward_types::ChanwardError;

mod commands;
mod report;

/// Slack channel lifecycle automation.
#[derive(Parser)]
#[command(name = "chanward", about = "Slack channel lifecycle automation", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Warn inactive channels and archive those past their grace period.
    Inactive(commands::inactive::InactiveArgs),

    /// Announce channels created within a recent window.
    Detect(commands::detect::DetectArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(e) = err.downcast_ref::<ChanwardError>() {
                eprintln!("hint: {}", e.remediation());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let cfg = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Inactive(args) => commands::inactive::run(args, &cfg).await,
        Commands::Detect(args) => commands::detect::run(args, &cfg).await,
    }
}
