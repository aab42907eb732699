//! The warning marker.
//!
//! Every inactivity warning ends with a link whose label is a zero-width
//! space, so Slack renders nothing visible. Its URL contains
//! [`MARKER_TOKEN`]. A message counts as a marker only when it contains the
//! token *and* was posted by our own bot, so users quoting a warning do not
//! restart the grace period.
//!
//! Archive notices carry a second invisible link, so a run that finds its
//! own notice after a failed `conversations.archive` retries the archive
//! without posting the notice again.

use chanward_types::{BotIdentity, HistoryMessage};

/// Substring identifying a warning marker in message text.
pub const MARKER_TOKEN: &str = "chanward.invalid/inactivity-warning";

/// Text appended to warnings. Renders as an invisible link.
pub const WARNING_MARKER: &str = "<https://chanward.invalid/inactivity-warning|\u{200B}>";

/// Substring identifying an archive notice in message text.
pub const NOTICE_TOKEN: &str = "chanward.invalid/archive-notice";

/// Text appended to archive notices.
pub const NOTICE_MARKER: &str = "<https://chanward.invalid/archive-notice|\u{200B}>";

/// Whether `msg` is a warning marker posted by `bot`.
pub fn is_warning_marker(msg: &HistoryMessage, bot: &BotIdentity) -> bool {
    bot.authored(msg) && msg.text.contains(MARKER_TOKEN)
}

/// Append the marker to a warning body.
pub fn with_marker(body: &str) -> String {
    format!("{body}\n{WARNING_MARKER}")
}

pub fn is_archive_notice(msg: &HistoryMessage, bot: &BotIdentity) -> bool {
    bot.authored(msg) && msg.text.contains(NOTICE_TOKEN)
}

pub fn with_notice_marker(body: &str) -> String {
    format!("{body}\n{NOTICE_MARKER}")
}
