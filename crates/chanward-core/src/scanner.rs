//! Activity scanning.
//!
//! Reads the most recent messages of a channel (at most
//! [`HISTORY_CEILING`](crate::HISTORY_CEILING)) and reduces them to an
//! [`ActivitySummary`]: when the channel was last used, whether our warning
//! marker is present, and who said what last.
//!
//! Our own lifecycle posts are not activity: warning markers, archive
//! notices, and `channel_join` notices (joining a channel in order to read
//! it must not make it look alive). Everything else counts, bots included.

use chrono::{DateTime, Utc};

use chanward_slack::GatedSlack;
use chanward_types::{BotIdentity, Channel, ChanwardError, HistoryMessage};

use crate::lifecycle::Observation;
use crate::marker::{is_archive_notice, is_warning_marker};
use crate::users::UserDirectory;

/// Our warning marker, as found in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningMarker {
    pub sent_at: DateTime<Utc>,
}

/// The newest message in the scanned window, for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastMessage {
    /// Author ID, when the message had one.
    pub author_id: Option<String>,
    /// Resolved display name, or the raw ID when the directory has none.
    pub author_name: Option<String>,
    pub text: String,
    pub is_bot: bool,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    /// Newest non-marker message, or channel creation when there is none.
    pub last_activity: DateTime<Utc>,
    /// Newest warning marker posted by us, if any is in the window.
    pub marker: Option<WarningMarker>,
    pub last_message: Option<LastMessage>,
    /// Our archive notice was posted at or after the newest marker, so an
    /// earlier archive attempt got as far as the notice.
    pub notice_posted: bool,
    /// Messages examined.
    pub scanned: usize,
}

impl ActivitySummary {
    /// The state machine's view of this channel.
    pub fn observation(&self, created: DateTime<Utc>) -> Observation {
        Observation {
            created,
            last_activity: self.last_activity,
            marker_sent_at: self.marker.map(|m| m.sent_at),
        }
    }
}

fn is_own_join(msg: &HistoryMessage, bot: &BotIdentity) -> bool {
    msg.subtype.as_deref() == Some("channel_join") && bot.authored(msg)
}

/// Reduce a window of history to a summary. Message order does not matter.
pub fn summarize(
    created: DateTime<Utc>,
    messages: &[HistoryMessage],
    bot: &BotIdentity,
    users: &UserDirectory,
) -> ActivitySummary {
    let marker = messages
        .iter()
        .filter(|m| is_warning_marker(m, bot))
        .map(|m| m.ts)
        .max()
        .map(|sent_at| WarningMarker { sent_at });

    let last_activity = messages
        .iter()
        .filter(|m| {
            !is_warning_marker(m, bot) && !is_archive_notice(m, bot) && !is_own_join(m, bot)
        })
        .map(|m| m.ts)
        .max()
        .unwrap_or(created);

    let notice_posted = marker.is_some_and(|m| {
        messages
            .iter()
            .any(|msg| is_archive_notice(msg, bot) && msg.ts >= m.sent_at)
    });

    let last_message = messages.iter().max_by_key(|m| m.ts).map(|m| {
        let author_id = m.author_id().map(str::to_owned);
        LastMessage {
            author_name: author_id.as_deref().map(|id| users.display_name(id).to_owned()),
            author_id,
            text: m.text.clone(),
            is_bot: m.is_bot(),
            ts: m.ts,
        }
    });

    ActivitySummary {
        last_activity,
        marker,
        last_message,
        notice_posted,
        scanned: messages.len(),
    }
}

/// Reads channel history through the gateway and summarizes it.
pub struct ActivityScanner<'a> {
    slack: &'a GatedSlack,
    bot: &'a BotIdentity,
    users: &'a UserDirectory,
}

impl<'a> ActivityScanner<'a> {
    pub fn new(slack: &'a GatedSlack, bot: &'a BotIdentity, users: &'a UserDirectory) -> Self {
        Self { slack, bot, users }
    }

    /// Scan one channel. Permission errors propagate unchanged so the
    /// caller can tell them apart from an idle channel.
    pub async fn scan(&self, channel: &Channel) -> Result<ActivitySummary, ChanwardError> {
        let messages = self.slack.history(channel, crate::HISTORY_CEILING).await?;
        Ok(summarize(channel.created, &messages, self.bot, self.users))
    }
}
