//! Slack Web API response payloads.
//!
//! Every response carries `ok`; failures add `error` and, for
//! `missing_scope`, the `needed` scope. Only the fields chanward reads are
//! modelled.

use serde::Deserialize;

use chanward_types::channel::{from_unix, parse_slack_ts};
use chanward_types::{BotIdentity, Channel, HistoryMessage, User};

/// Fields common to every response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    pub ok: bool,
    pub error: Option<String>,
    /// Scope required when `error == "missing_scope"`.
    pub needed: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    /// Slack signals the last page with an empty cursor.
    pub fn cursor(&self) -> Option<String> {
        Some(self.next_cursor.clone()).filter(|c| !c.is_empty())
    }
}

/// `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTestResponse {
    pub user_id: String,
    pub bot_id: Option<String>,
}

impl From<AuthTestResponse> for BotIdentity {
    fn from(r: AuthTestResponse) -> Self {
        BotIdentity::new(r.user_id, r.bot_id)
    }
}

/// `conversations.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsListResponse {
    #[serde(default)]
    pub channels: Vec<WireChannel>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

/// A channel object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireChannel {
    pub id: String,
    pub name: String,
    pub created: i64,
    #[serde(default)]
    pub num_members: Option<u32>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_member: bool,
}

impl WireChannel {
    /// `None` when `created` is out of range.
    pub fn into_channel(self) -> Option<Channel> {
        Some(Channel {
            created: from_unix(self.created)?,
            id: self.id,
            name: self.name,
            member_count: self.num_members.unwrap_or(0),
            is_archived: self.is_archived,
            is_member: self.is_member,
        })
    }
}

/// `conversations.history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// A message object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
}

impl WireMessage {
    /// `None` when `ts` is malformed.
    pub fn into_message(self) -> Option<HistoryMessage> {
        Some(HistoryMessage {
            ts: parse_slack_ts(&self.ts)?,
            user: self.user,
            bot_id: self.bot_id,
            subtype: self.subtype,
            text: self.text,
        })
    }
}

/// `chat.postMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    pub ts: Option<String>,
}

/// Responses whose payload chanward ignores (`conversations.join`, `conversations.archive`).
#[derive(Debug, Clone, Deserialize)]
pub struct Empty {}

/// `users.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersListResponse {
    #[serde(default)]
    pub members: Vec<WireUser>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

/// A user object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub real_name: Option<String>,
    #[serde(default)]
    pub profile: Option<WireProfile>,
}

/// The `profile` sub-object of a user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireProfile {
    pub display_name: Option<String>,
    pub real_name: Option<String>,
}

impl From<WireUser> for User {
    fn from(u: WireUser) -> Self {
        let profile = u.profile.unwrap_or_default();
        let display_name = [profile.display_name, profile.real_name, u.real_name]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
            .unwrap_or(u.name);
        User {
            id: u.id,
            display_name,
        }
    }
}
