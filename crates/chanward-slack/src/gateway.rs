//! Rate-limited API gateway.
//!
//! [`Gateway::call`] runs one remote operation under a [`RetryPolicy`]:
//!
//! - each attempt is bounded by a deadline ([`SHORT_DEADLINE`] for single
//!   reads and writes, [`LONG_DEADLINE`] for listings);
//! - when the policy's `wait_for` function extracts a wait from the error
//!   (Slack's rate-limit signal), the gateway sleeps for exactly that long,
//!   logging progress, and tries again;
//! - after `max_attempts` rate-limited attempts it gives up with
//!   [`ChanwardError::RateLimited`];
//! - any other error is returned at once, classified and tagged with the
//!   attempt count.
//!
//! The waits block the caller. Pipelines run channels one at a time, so a
//! rate limit pauses the whole run rather than piling up more requests.
//!
//! [`GatedSlack`] pairs a [`SlackApi`] with a gateway and exposes each Slack
//! operation under a descriptive operation name. Pagination loops live here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use chanward_types::{BotIdentity, Channel, ChanwardError, HistoryMessage, SlackError, User};

use crate::traits::SlackApi;

/// Deadline for a single read or write.
pub const SHORT_DEADLINE: Duration = Duration::from_secs(30);

/// Deadline for calls that enumerate many channels or users.
pub const LONG_DEADLINE: Duration = Duration::from_secs(120);

/// Retry behaviour of the gateway.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default: 3).
    pub max_attempts: u32,
    /// Extracts the wait Slack asked for; `None` means "do not retry".
    pub wait_for: fn(&SlackError) -> Option<Duration>,
    /// How often to report progress during a wait (default: 10 seconds).
    pub progress_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait_for: SlackError::retry_after,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Executes remote operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Gateway {
    policy: RetryPolicy,
}

impl Gateway {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `op` until it succeeds, fails for a non-rate-limit reason, or the
    /// attempt budget is spent.
    pub async fn call<T, F, Fut>(
        &self,
        operation: &str,
        deadline: Duration,
        mut op: F,
    ) -> Result<T, ChanwardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SlackError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(deadline, op()).await {
                Ok(result) => result,
                Err(_) => Err(SlackError::Timeout {
                    method: operation.to_owned(),
                    after: deadline,
                }),
            };

            let err = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "succeeded after rate-limit wait");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let Some(wait) = (self.policy.wait_for)(&err) else {
                return Err(ChanwardError::from_slack(operation, attempt, err));
            };

            if attempt >= max_attempts {
                warn!(operation, attempts = attempt, "rate limit retries exhausted");
                return Err(ChanwardError::from_slack(operation, attempt, err));
            }

            self.wait(operation, attempt, max_attempts, wait).await;
        }
    }

    async fn wait(&self, operation: &str, attempt: u32, max_attempts: u32, wait: Duration) {
        warn!(
            operation,
            attempt,
            max_attempts,
            wait_secs = wait.as_secs_f64(),
            "rate limited by Slack, waiting before retry"
        );

        let interval = self.policy.progress_interval.max(Duration::from_millis(1));
        let mut remaining = wait;
        while !remaining.is_zero() {
            let step = remaining.min(interval);
            tokio::time::sleep(step).await;
            remaining -= step;
            if !remaining.is_zero() {
                info!(operation, remaining_secs = remaining.as_secs(), "waiting for rate limit");
            }
        }
    }
}

/// A [`SlackApi`] whose every call goes through a [`Gateway`].
#[derive(Clone)]
pub struct GatedSlack {
    api: Arc<dyn SlackApi>,
    gateway: Gateway,
}

impl GatedSlack {
    pub fn new(api: Arc<dyn SlackApi>, gateway: Gateway) -> Self {
        Self { api, gateway }
    }

    /// Resolve the bot's own identity.
    pub async fn identify(&self) -> Result<BotIdentity, ChanwardError> {
        self.gateway
            .call("identify the bot (auth.test)", SHORT_DEADLINE, || self.api.auth_test())
            .await
    }

    /// Every unarchived public channel, following pagination to the end.
    pub async fn channels(&self) -> Result<Vec<Channel>, ChanwardError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .gateway
                .call("list channels (conversations.list)", LONG_DEADLINE, || {
                    self.api.list_channels(cursor.as_deref())
                })
                .await?;
            all.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        debug!(count = all.len(), "listed channels");
        Ok(all)
    }

    /// The most recent `limit` messages of a channel.
    pub async fn history(
        &self,
        channel: &Channel,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, ChanwardError> {
        self.history_of(&channel.id, &channel.display_name(), limit).await
    }

    /// History by ID, with `label` naming the channel in errors.
    pub async fn history_of(
        &self,
        channel_id: &str,
        label: &str,
        limit: u32,
    ) -> Result<Vec<HistoryMessage>, ChanwardError> {
        let op = format!("read history of {label} (conversations.history)");
        self.gateway
            .call(&op, SHORT_DEADLINE, || self.api.history(channel_id, limit))
            .await
    }

    /// Post `text` to a channel, returning the message `ts`.
    pub async fn post(&self, channel_id: &str, label: &str, text: &str) -> Result<String, ChanwardError> {
        let op = format!("post to {label} (chat.postMessage)");
        self.gateway
            .call(&op, SHORT_DEADLINE, || self.api.post_message(channel_id, text))
            .await
    }

    /// Join a channel.
    pub async fn join(&self, channel: &Channel) -> Result<(), ChanwardError> {
        let op = format!("join {} (conversations.join)", channel.display_name());
        self.gateway
            .call(&op, SHORT_DEADLINE, || self.api.join(&channel.id))
            .await
    }

    /// Archive a channel.
    pub async fn archive(&self, channel: &Channel) -> Result<(), ChanwardError> {
        let op = format!("archive {} (conversations.archive)", channel.display_name());
        self.gateway
            .call(&op, SHORT_DEADLINE, || self.api.archive(&channel.id))
            .await
    }

    /// Every workspace member, following pagination to the end.
    pub async fn users(&self) -> Result<Vec<User>, ChanwardError> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .gateway
                .call("list users (users.list)", LONG_DEADLINE, || {
                    self.api.list_users(cursor.as_deref())
                })
                .await?;
            all.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(all)
    }
}
