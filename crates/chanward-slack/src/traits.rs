//! The Slack operations chanward consumes.
//!
//! [`SlackApi`] is deliberately narrow: one method per Web API call, no
//! retries, no pagination loops. Retrying and paging are the gateway's job,
//! which keeps fakes in tests trivial to write.

use async_trait::async_trait;

use chanward_types::{BotIdentity, Channel, HistoryMessage, SlackError, User};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page; `None` when this was the last one.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A single, final page.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

/// Remote operations against a Slack workspace.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `auth.test`: who is this token?
    async fn auth_test(&self) -> Result<BotIdentity, SlackError>;

    /// `conversations.list`: one page of unarchived public channels.
    async fn list_channels(&self, cursor: Option<&str>) -> Result<Page<Channel>, SlackError>;

    /// `conversations.history`: the `limit` most recent messages, newest first.
    async fn history(&self, channel_id: &str, limit: u32)
    -> Result<Vec<HistoryMessage>, SlackError>;

    /// `chat.postMessage`: returns the new message's `ts`.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String, SlackError>;

    /// `conversations.join`: succeeds when already a member.
    async fn join(&self, channel_id: &str) -> Result<(), SlackError>;

    /// `conversations.archive`: succeeds when already archived.
    async fn archive(&self, channel_id: &str) -> Result<(), SlackError>;

    /// `users.list`: one page of members.
    async fn list_users(&self, cursor: Option<&str>) -> Result<Page<User>, SlackError>;
}
