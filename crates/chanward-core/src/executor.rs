//! Carrying out decisions.
//!
//! A warning is a channel post that ends with the hidden marker. An archive
//! is a short notice followed by `conversations.archive`; when an earlier
//! run posted the notice but failed to archive, only the archive is retried.
//! The bot joins a channel before posting to it when it is not already a
//! member.
//!
//! In dry-run mode nothing is sent; each action renders the message it
//! would have posted.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use chanward_slack::GatedSlack;
use chanward_types::threshold::format_duration;
use chanward_types::{Channel, ChanwardError, Thresholds};

use crate::lifecycle::Decision;
use crate::marker::{with_marker, with_notice_marker};

/// Body of the inactivity warning, marker included.
pub fn warning_text(thresholds: &Thresholds) -> String {
    with_marker(&format!(
        ":warning: This channel has had no activity for more than {}. \
         It will be archived in {} unless it is added to the exclusion list. \
         Archived channels can be restored by a workspace admin.",
        format_duration(thresholds.warn_after),
        format_duration(thresholds.archive_after),
    ))
}

/// Notice posted immediately before archiving.
pub fn archive_notice(thresholds: &Thresholds) -> String {
    with_notice_marker(&format!(
        ":file_cabinet: Archiving this channel: it was warned more than {} ago. \
         A workspace admin can unarchive it if it is still needed.",
        format_duration(thresholds.archive_after),
    ))
}

/// What happened to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Warned { ts: String },
    Archived,
    /// Dry run: the message that would have been posted.
    Previewed { message: String },
}

#[derive(Debug)]
pub struct ActionFailure {
    pub channel: Channel,
    pub decision: Decision,
    pub error: ChanwardError,
}

/// Results of executing a batch of decisions.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<(Channel, Decision, Outcome)>,
    pub failed: Vec<ActionFailure>,
    /// Set when a fatal error stopped the batch early. The failing channel
    /// is also listed in `failed`.
    pub aborted: bool,
}

impl BatchReport {
    pub fn count(&self, decision: Decision) -> usize {
        self.completed.iter().filter(|(_, d, _)| *d == decision).count()
    }
}

pub struct Executor<'a> {
    slack: &'a GatedSlack,
    thresholds: Thresholds,
    dry_run: bool,
    /// Channels whose archive notice is already in history.
    notified: HashSet<String>,
}

impl<'a> Executor<'a> {
    pub fn new(slack: &'a GatedSlack, thresholds: Thresholds, dry_run: bool) -> Self {
        Self {
            slack,
            thresholds,
            dry_run,
            notified: HashSet::new(),
        }
    }

    /// Skip the archive notice for these channel IDs.
    pub fn with_notified(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.notified.extend(ids);
        self
    }

    /// Warn one channel.
    pub async fn warn(&self, channel: &Channel) -> Result<Outcome, ChanwardError> {
        let text = warning_text(&self.thresholds);
        if self.dry_run {
            return Ok(Outcome::Previewed { message: text });
        }
        self.ensure_member(channel).await?;
        let ts = self
            .slack
            .post(&channel.id, &channel.display_name(), &text)
            .await?;
        info!(channel = %channel.display_name(), %ts, "posted inactivity warning");
        Ok(Outcome::Warned { ts })
    }

    /// Post the archival notice, then archive.
    pub async fn archive(&self, channel: &Channel) -> Result<Outcome, ChanwardError> {
        let notice = archive_notice(&self.thresholds);
        if self.dry_run {
            return Ok(Outcome::Previewed { message: notice });
        }
        self.ensure_member(channel).await?;
        if self.notified.contains(&channel.id) {
            debug!(channel = %channel.display_name(), "archive notice already posted");
        } else {
            self.slack
                .post(&channel.id, &channel.display_name(), &notice)
                .await?;
        }
        self.slack.archive(channel).await?;
        info!(channel = %channel.display_name(), "archived channel");
        Ok(Outcome::Archived)
    }

    pub async fn execute(
        &self,
        decision: Decision,
        channel: &Channel,
    ) -> Result<Option<Outcome>, ChanwardError> {
        match decision {
            Decision::None => Ok(None),
            Decision::Warn => self.warn(channel).await.map(Some),
            Decision::Archive => self.archive(channel).await.map(Some),
        }
    }

    /// Execute decisions one channel at a time. A failure is recorded and the
    /// batch moves on; a fatal failure stops it.
    pub async fn execute_batch(&self, plan: Vec<(Channel, Decision)>) -> BatchReport {
        let mut report = BatchReport::default();
        for (channel, decision) in plan {
            match self.execute(decision, &channel).await {
                Ok(Some(outcome)) => report.completed.push((channel, decision, outcome)),
                Ok(None) => {}
                Err(error) => {
                    let fatal = error.is_fatal();
                    warn!(
                        channel = %channel.display_name(),
                        %decision,
                        error = %error,
                        fatal,
                        "action failed"
                    );
                    report.failed.push(ActionFailure {
                        channel,
                        decision,
                        error,
                    });
                    if fatal {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }
        report
    }

    async fn ensure_member(&self, channel: &Channel) -> Result<(), ChanwardError> {
        if !channel.is_member {
            self.slack.join(channel).await?;
        }
        Ok(())
    }
}
