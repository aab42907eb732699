//! `chanward detect` -- announce newly created channels.
//!
//! # Example
//!
//! ```text
//! chanward detect --since 1d --announce-channel '#new-channels'
//! ```

use std::process::ExitCode;

use chrono::Utc;
use clap::Args;

use chanward_core::announce::{AnnounceOptions, run_announce};
use chanward_types::ChanwardError;
use chanward_types::config::Config;
use chanward_types::threshold::{bounded_delta, parse_duration};

use super::{connect, exclusions};
use crate::report;

/// Arguments for the `chanward detect` subcommand.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// How far back to look for new channels (default from config, else 1d).
    #[arg(long)]
    pub since: Option<String>,

    /// Channel to post the announcement in, by name or ID.
    #[arg(long)]
    pub announce_channel: Option<String>,

    /// Comma-separated channel names never to announce.
    #[arg(long)]
    pub exclude_channels: Option<String>,

    /// Comma-separated channel name prefixes never to announce.
    #[arg(long)]
    pub exclude_prefixes: Option<String>,

    /// Print the announcement instead of posting it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Merge flags over the config file and validate.
pub fn options(args: &DetectArgs, cfg: &Config) -> Result<AnnounceOptions, ChanwardError> {
    let lc = &cfg.lifecycle;

    let since = args.since.as_deref().unwrap_or(&lc.new_channel_window);
    let window = parse_duration(since)
        .map_err(|e| ChanwardError::config(format!("detection window: {e}")))?;
    let window = bounded_delta("detection window", window)?;

    let announce_channel = args
        .announce_channel
        .clone()
        .or_else(|| lc.announce_channel.clone())
        .filter(|c| !c.trim().trim_start_matches('#').is_empty())
        .ok_or_else(|| {
            ChanwardError::config(
                "no announcement channel: pass --announce-channel or set lifecycle.announceChannel",
            )
        })?;

    Ok(AnnounceOptions {
        window,
        exclusions: exclusions(
            lc,
            args.exclude_channels.as_deref(),
            args.exclude_prefixes.as_deref(),
        ),
        announce_channel,
        dry_run: args.dry_run,
    })
}

/// Run detection and print the report.
pub async fn run(args: DetectArgs, cfg: &Config) -> anyhow::Result<ExitCode> {
    let opts = options(&args, cfg)?;
    let slack = connect(&cfg.slack)?;

    let report = run_announce(&slack, &opts, Utc::now()).await?;
    print!("{}", report::render_announce(&report));
    Ok(ExitCode::SUCCESS)
}
