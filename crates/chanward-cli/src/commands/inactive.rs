//! `chanward inactive` -- warn idle channels, archive unanswered warnings.
//!
//! # Example
//!
//! ```text
//! chanward inactive --warn-after 30d --archive-after 7d --exclude-prefixes ext- --dry-run
//! ```

use std::process::ExitCode;

use chrono::Utc;
use clap::Args;

use chanward_core::sweep::{SweepOptions, run_sweep};
use chanward_types::config::Config;
use chanward_types::{ChanwardError, Thresholds};

use super::{connect, exclusions};
use crate::report;

/// Arguments for the `chanward inactive` subcommand.
#[derive(Args, Debug)]
pub struct InactiveArgs {
    /// Inactivity before a warning is posted (e.g. 30d, 12h, 1d12h).
    #[arg(long)]
    pub warn_after: Option<String>,

    /// Grace period between the warning and archival.
    #[arg(long)]
    pub archive_after: Option<String>,

    /// Comma-separated channel names never to touch.
    #[arg(long)]
    pub exclude_channels: Option<String>,

    /// Comma-separated channel name prefixes never to touch.
    #[arg(long)]
    pub exclude_prefixes: Option<String>,

    /// Report what would happen without posting, joining or archiving.
    #[arg(long)]
    pub dry_run: bool,
}

/// Merge flags over the config file and validate.
pub fn options(args: &InactiveArgs, cfg: &Config) -> Result<SweepOptions, ChanwardError> {
    let lc = &cfg.lifecycle;
    let thresholds = Thresholds::parse(
        args.warn_after.as_deref().unwrap_or(&lc.warn_after),
        args.archive_after.as_deref().unwrap_or(&lc.archive_after),
    )?;
    Ok(SweepOptions {
        thresholds,
        exclusions: exclusions(
            lc,
            args.exclude_channels.as_deref(),
            args.exclude_prefixes.as_deref(),
        ),
        dry_run: args.dry_run,
    })
}

/// Run the sweep and print the report.
pub async fn run(args: InactiveArgs, cfg: &Config) -> anyhow::Result<ExitCode> {
    let opts = options(&args, cfg)?;
    let slack = connect(&cfg.slack)?;

    let report = run_sweep(&slack, &opts, Utc::now()).await?;
    print!("{}", report::render_sweep(&report));

    Ok(if report.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
