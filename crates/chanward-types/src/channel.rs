//! Channels, history messages and the bot identity.
//!
//! These are the decoded, Slack-agnostic shapes the lifecycle engine works
//! with. The wire formats live in `chanward-slack`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A workspace channel as reported by the channel listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Opaque channel ID (`C0123...`).
    pub id: String,
    /// Display name without the leading `#`.
    pub name: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Member count at listing time. Informational only.
    pub member_count: u32,
    /// Whether the channel is already archived.
    pub is_archived: bool,
    /// Whether the bot is already a member.
    pub is_member: bool,
}

impl Channel {
    /// `#name` form used in logs and reports.
    pub fn display_name(&self) -> String {
        format!("#{}", self.name)
    }
}

/// One message from a channel's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Author user ID. Absent for some integration posts.
    pub user: Option<String>,
    /// Bot ID when the message was posted by an app.
    pub bot_id: Option<String>,
    /// Message subtype (`bot_message`, `channel_join`, ...).
    pub subtype: Option<String>,
    /// Raw message text.
    pub text: String,
    /// Message timestamp.
    pub ts: DateTime<Utc>,
}

impl HistoryMessage {
    /// Whether an app or integration authored this message.
    pub fn is_bot(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }

    /// Author identifier for display, preferring the user ID.
    pub fn author_id(&self) -> Option<&str> {
        self.user.as_deref().or(self.bot_id.as_deref())
    }
}

/// A workspace member, reduced to what reports need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Display name, falling back to real name, then handle.
    pub display_name: String,
}

/// The automation's own identity, as returned by `auth.test`.
///
/// Passed explicitly to the scanner and the duplicate detector so that
/// "is this one of ours?" never depends on global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// The bot user's ID (`U0...`).
    pub user_id: String,
    /// The app's bot ID (`B0...`), when the token belongs to an app bot.
    pub bot_id: Option<String>,
}

impl BotIdentity {
    pub fn new(user_id: impl Into<String>, bot_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            bot_id,
        }
    }

    /// Whether `msg` was posted by this bot.
    pub fn authored(&self, msg: &HistoryMessage) -> bool {
        if msg.user.as_deref() == Some(self.user_id.as_str()) {
            return true;
        }
        match (&self.bot_id, &msg.bot_id) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}

/// Parse a Slack message timestamp (`"1700000000.000100"`).
pub fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = match ts.split_once('.') {
        Some((s, f)) => (s, f),
        None => (ts, "0"),
    };
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    Utc.timestamp_opt(secs, micros * 1_000).single()
}

/// Convert a Unix `created` field into a timestamp.
pub fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(user: Option<&str>, bot_id: Option<&str>) -> HistoryMessage {
        HistoryMessage {
            user: user.map(String::from),
            bot_id: bot_id.map(String::from),
            subtype: None,
            text: "hello".into(),
            ts: from_unix(1_700_000_000).unwrap(),
        }
    }

    #[test]
    fn parse_ts_with_fraction() {
        let ts = parse_slack_ts("1700000000.000100").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 100);
    }

    #[test]
    fn parse_ts_without_fraction() {
        assert_eq!(parse_slack_ts("1700000000").unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn parse_ts_rejects_garbage() {
        assert!(parse_slack_ts("yesterday").is_none());
        assert!(parse_slack_ts("").is_none());
    }

    #[test]
    fn identity_matches_user_id() {
        let me = BotIdentity::new("U_BOT", None);
        assert!(me.authored(&msg(Some("U_BOT"), None)));
        assert!(!me.authored(&msg(Some("U_HUMAN"), None)));
    }

    #[test]
    fn identity_matches_bot_id() {
        let me = BotIdentity::new("U_BOT", Some("B_OURS".into()));
        assert!(me.authored(&msg(None, Some("B_OURS"))));
        assert!(!me.authored(&msg(None, Some("B_OTHER"))));
    }

    #[test]
    fn bot_flag_from_subtype() {
        let mut m = msg(None, None);
        assert!(!m.is_bot());
        m.subtype = Some("bot_message".into());
        assert!(m.is_bot());
    }

    #[test]
    fn display_name_has_hash() {
        let ch = Channel {
            id: "C1".into(),
            name: "general".into(),
            created: from_unix(0).unwrap(),
            member_count: 3,
            is_archived: false,
            is_member: true,
        };
        assert_eq!(ch.display_name(), "#general");
    }
}
