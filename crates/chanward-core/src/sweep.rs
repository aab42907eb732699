//! The inactive-channel pipeline.
//!
//! 1. Resolve the bot identity and load the user directory.
//! 2. List every unarchived public channel.
//! 3. Drop excluded channels. Channels younger than the warn threshold are
//!    recorded without reading their history.
//! 4. Scan each remaining channel and classify it.
//! 5. Execute the warn and archive decisions.
//!
//! Channels are processed one at a time. A channel that disappeared or
//! cannot be read is skipped. Rate-limit exhaustion and missing permissions
//! abort the run.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use chanward_slack::GatedSlack;
use chanward_types::{Channel, ChanwardError, Thresholds};

use crate::exclusion::ExclusionSet;
use crate::executor::{BatchReport, Executor};
use crate::lifecycle::{Decision, LifecycleState, created_within, infer_state};
use crate::scanner::{ActivityScanner, ActivitySummary};
use crate::users::UserDirectory;

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub thresholds: Thresholds,
    pub exclusions: ExclusionSet,
    pub dry_run: bool,
}

/// One evaluated channel.
#[derive(Debug, Clone)]
pub struct ChannelRow {
    pub channel: Channel,
    pub summary: ActivitySummary,
    pub state: LifecycleState,
    pub decision: Decision,
}

/// A channel that could not be evaluated.
#[derive(Debug)]
pub struct SkippedChannel {
    pub channel: Channel,
    pub error: ChanwardError,
}

#[derive(Debug)]
pub struct SweepReport {
    pub rows: Vec<ChannelRow>,
    pub excluded: Vec<Channel>,
    pub skipped: Vec<SkippedChannel>,
    pub actions: BatchReport,
    pub dry_run: bool,
}

impl SweepReport {
    pub fn warned(&self) -> usize {
        self.actions.count(Decision::Warn)
    }

    pub fn archived(&self) -> usize {
        self.actions.count(Decision::Archive)
    }

    pub fn failed(&self) -> usize {
        self.actions.failed.len()
    }

    /// `3 warned, 1 archived, 0 failed`, or `would ...` for a dry run.
    pub fn summary_line(&self) -> String {
        if self.dry_run {
            format!(
                "would warn {}, would archive {}, {} failed",
                self.warned(),
                self.archived(),
                self.failed()
            )
        } else {
            format!(
                "{} warned, {} archived, {} failed",
                self.warned(),
                self.archived(),
                self.failed()
            )
        }
    }
}

/// Run the inactive-channel pipeline as of `now`.
pub async fn run_sweep(
    slack: &GatedSlack,
    opts: &SweepOptions,
    now: DateTime<Utc>,
) -> Result<SweepReport, ChanwardError> {
    let bot = slack.identify().await?;
    debug!(user_id = %bot.user_id, "resolved bot identity");
    let users = UserDirectory::load(slack).await;
    let scanner = ActivityScanner::new(slack, &bot, &users);

    let channels = slack.channels().await?;
    info!(count = channels.len(), dry_run = opts.dry_run, "evaluating channels");

    let mut rows = Vec::new();
    let mut excluded = Vec::new();
    let mut skipped = Vec::new();

    for mut channel in channels {
        if channel.is_archived {
            continue;
        }
        if opts.exclusions.is_excluded(&channel.name) {
            debug!(channel = %channel.display_name(), "excluded");
            excluded.push(channel);
            continue;
        }

        if created_within(channel.created, opts.thresholds.warn_after, now) {
            debug!(channel = %channel.display_name(), "too new to evaluate");
            rows.push(ChannelRow {
                summary: ActivitySummary {
                    last_activity: channel.created,
                    marker: None,
                    last_message: None,
                    notice_posted: false,
                    scanned: 0,
                },
                channel,
                state: LifecycleState::Active,
                decision: Decision::None,
            });
            continue;
        }

        let scanned = scan_channel(slack, &scanner, &mut channel, opts.dry_run).await;
        let summary = match scanned {
            Ok(summary) => summary,
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                warn!(channel = %channel.display_name(), error = %error, "skipping channel");
                skipped.push(SkippedChannel { channel, error });
                continue;
            }
        };

        let state = infer_state(&summary.observation(channel.created), &opts.thresholds, now);
        debug!(
            channel = %channel.display_name(),
            scanned = summary.scanned,
            %state,
            "classified"
        );
        rows.push(ChannelRow {
            channel,
            summary,
            state,
            decision: state.decision(),
        });
    }

    let plan: Vec<(Channel, Decision)> = rows
        .iter()
        .filter(|r| r.decision != Decision::None)
        .map(|r| (r.channel.clone(), r.decision))
        .collect();

    let notified = rows
        .iter()
        .filter(|r| r.decision == Decision::Archive && r.summary.notice_posted)
        .map(|r| r.channel.id.clone());
    let executor = Executor::new(slack, opts.thresholds, opts.dry_run).with_notified(notified);
    let actions = executor.execute_batch(plan).await;

    let report = SweepReport {
        rows,
        excluded,
        skipped,
        actions,
        dry_run: opts.dry_run,
    };
    info!(summary = %report.summary_line(), "sweep finished");
    Ok(report)
}

/// Scan, joining once and retrying when the bot cannot see a channel it is
/// not a member of. Dry runs never join.
async fn scan_channel(
    slack: &GatedSlack,
    scanner: &ActivityScanner<'_>,
    channel: &mut Channel,
    dry_run: bool,
) -> Result<ActivitySummary, ChanwardError> {
    let first = scanner.scan(channel).await;
    match first {
        Err(ChanwardError::NotFound { .. }) if !channel.is_member && !dry_run => {
            debug!(channel = %channel.display_name(), "joining to read history");
            slack.join(channel).await?;
            channel.is_member = true;
            scanner.scan(channel).await
        }
        other => other,
    }
}
