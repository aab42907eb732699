//! The new-channel pipeline.
//!
//! Finds channels created within a window, drops excluded ones and those
//! already announced, and posts one announcement listing the rest to the
//! announcement channel. Channels are referenced as `<#ID>` so Slack renders
//! live links and later runs can recognize them.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use chanward_slack::GatedSlack;
use chanward_types::{Channel, ChanwardError};

use crate::duplicate::{DuplicateCheck, DuplicateDetector};
use crate::exclusion::ExclusionSet;
use crate::lifecycle::created_within;

#[derive(Debug, Clone)]
pub struct AnnounceOptions {
    /// How far back to look for new channels.
    pub window: TimeDelta,
    pub exclusions: ExclusionSet,
    /// Announcement channel, by name (`#new-channels`) or ID.
    pub announce_channel: String,
    pub dry_run: bool,
}

/// A rendered announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    /// IDs of the channels the text references.
    pub mentions: BTreeSet<String>,
}

/// Channels created after `now - window`, oldest first.
pub fn new_channels(
    channels: &[Channel],
    window: TimeDelta,
    now: DateTime<Utc>,
    exclusions: &ExclusionSet,
) -> Vec<Channel> {
    let mut found: Vec<Channel> = channels
        .iter()
        .filter(|c| {
            !c.is_archived && created_within(c.created, window, now) && !exclusions.is_excluded(&c.name)
        })
        .cloned()
        .collect();
    found.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name)));
    found
}

/// Find a channel by ID or by name, with or without `#`.
pub fn resolve_channel<'a>(channels: &'a [Channel], wanted: &str) -> Option<&'a Channel> {
    let wanted = wanted.trim();
    let name = wanted.strip_prefix('#').unwrap_or(wanted);
    channels
        .iter()
        .find(|c| c.id == wanted)
        .or_else(|| channels.iter().find(|c| c.name == name))
}

pub fn format_announcement(channels: &[Channel]) -> Announcement {
    let heading = if channels.len() == 1 {
        ":new: A new channel was created:".to_owned()
    } else {
        format!(":new: {} new channels were created:", channels.len())
    };
    let mut text = heading;
    for c in channels {
        let members = if c.member_count == 1 { "member" } else { "members" };
        text.push_str(&format!("\n• <#{}> ({} {members})", c.id, c.member_count));
    }
    Announcement {
        text,
        mentions: channels.iter().map(|c| c.id.clone()).collect(),
    }
}

#[derive(Debug, Default)]
pub struct AnnounceReport {
    /// New, non-excluded channels in the window.
    pub candidates: Vec<Channel>,
    /// Candidate names skipped because they were already announced.
    pub already_announced: BTreeSet<String>,
    /// The duplicate check failed transiently and was skipped.
    pub duplicate_check_degraded: bool,
    pub announcement: Option<Announcement>,
    /// `ts` of the posted announcement; `None` for dry runs.
    pub posted_ts: Option<String>,
    pub dry_run: bool,
}

impl AnnounceReport {
    pub fn announced(&self) -> usize {
        self.announcement.as_ref().map_or(0, |a| a.mentions.len())
    }
}

/// Run the new-channel pipeline as of `now`.
pub async fn run_announce(
    slack: &GatedSlack,
    opts: &AnnounceOptions,
    now: DateTime<Utc>,
) -> Result<AnnounceReport, ChanwardError> {
    let bot = slack.identify().await?;
    let channels = slack.channels().await?;

    let mut announce = resolve_channel(&channels, &opts.announce_channel)
        .cloned()
        .ok_or_else(|| {
            ChanwardError::config(format!(
                "announcement channel {} was not found among public channels",
                opts.announce_channel
            ))
        })?;

    let candidates: Vec<Channel> = new_channels(&channels, opts.window, now, &opts.exclusions)
        .into_iter()
        .filter(|c| c.id != announce.id)
        .collect();
    info!(count = candidates.len(), "new channels in window");

    let mut report = AnnounceReport {
        candidates,
        dry_run: opts.dry_run,
        ..AnnounceReport::default()
    };
    if report.candidates.is_empty() {
        return Ok(report);
    }

    // Slack only returns history to members, so join before the check.
    if !announce.is_member && !opts.dry_run {
        debug!(channel = %announce.display_name(), "joining announcement channel");
        slack.join(&announce).await?;
        announce.is_member = true;
    }

    let checked = DuplicateDetector::new(slack, &bot)
        .check(&announce, &report.candidates)
        .await;
    let check = match checked {
        Err(ChanwardError::NotFound { .. }) if !announce.is_member => {
            warn!(
                channel = %announce.display_name(),
                "dry run cannot read the announcement channel without joining, duplicate check skipped"
            );
            DuplicateCheck {
                announced: BTreeSet::new(),
                degraded: true,
            }
        }
        other => other?,
    };
    report.duplicate_check_degraded = check.degraded;

    let fresh: Vec<Channel> = report
        .candidates
        .iter()
        .filter(|c| !check.announced.contains(&c.name))
        .cloned()
        .collect();
    report.already_announced = check.announced;

    if fresh.is_empty() {
        debug!("every new channel was already announced");
        return Ok(report);
    }

    let announcement = format_announcement(&fresh);
    if !opts.dry_run {
        let ts = slack
            .post(&announce.id, &announce.display_name(), &announcement.text)
            .await?;
        info!(channel = %announce.display_name(), count = fresh.len(), "posted announcement");
        report.posted_ts = Some(ts);
    }
    report.announcement = Some(announcement);
    Ok(report)
}
