//! Error types for chanward.
//!
//! Two layers:
//!
//! - [`SlackError`] describes the outcome of a single Slack Web API call,
//!   as decoded from the HTTP status and the `ok`/`error` response fields.
//! - [`ChanwardError`] is the operator-facing taxonomy. The rate-limited
//!   gateway converts every `SlackError` into one of its variants once the
//!   retry budget is settled, attaching the operation name and attempt
//!   count. Each variant carries a concrete [`remediation`] hint.
//!
//! [`remediation`]: ChanwardError::remediation

use std::time::Duration;

use thiserror::Error;

/// Failure of a single Slack Web API call.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SlackError {
    /// Slack answered HTTP 429 or `ratelimited`.
    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Provider-suggested wait before retrying, in milliseconds.
        retry_after_ms: u64,
    },

    /// The token lacks an OAuth scope (`missing_scope`).
    #[error("{method} requires the `{needed}` scope")]
    MissingScope {
        /// API method that was called.
        method: String,
        /// Scope named in the `needed` response field.
        needed: String,
    },

    /// The referenced channel or user does not exist or is invisible to the bot.
    #[error("{method}: {error}")]
    NotFound {
        /// API method that was called.
        method: String,
        /// Slack error code (e.g. `channel_not_found`).
        error: String,
    },

    /// The bot must join the channel before it can read or post.
    #[error("bot is not a member of channel {channel}")]
    NotInChannel {
        /// Channel ID.
        channel: String,
    },

    /// Any other `ok: false` response.
    #[error("{method} failed: {error}")]
    Api {
        /// API method that was called.
        method: String,
        /// Slack error code.
        error: String,
    },

    /// Transport-level failure (DNS, TLS, connection reset, non-JSON 5xx).
    #[error("http error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call exceeded its deadline.
    #[error("{method} timed out after {}s", .after.as_secs())]
    Timeout {
        /// API method that was called.
        method: String,
        /// The deadline that elapsed.
        after: Duration,
    },
}

impl SlackError {
    /// Provider-suggested wait, when this is a rate-limit signal.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_ms } => Some(Duration::from_millis(*retry_after_ms)),
            _ => None,
        }
    }
}

/// Operator-facing error taxonomy.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChanwardError {
    /// Retries were exhausted against provider backoff.
    #[error("{operation}: still rate limited after {attempts} attempts")]
    RateLimited {
        /// Logical operation (e.g. `conversations.history #general`).
        operation: String,
        /// Attempts made, including the first.
        attempts: u32,
        /// Last wait Slack asked for.
        retry_after: Duration,
    },

    /// The Slack app is missing an OAuth scope.
    #[error("missing permission `{scope}` (needed to {action})")]
    MissingPermission {
        /// OAuth scope to add.
        scope: String,
        /// What chanward was trying to do.
        action: String,
    },

    /// The entity no longer exists or the bot cannot see it.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// Any other remote failure.
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    Transient {
        /// Logical operation.
        operation: String,
        /// Attempts made, including the first.
        attempts: u32,
        /// The underlying call failure.
        #[source]
        source: SlackError,
    },

    /// Flags or configuration are malformed; raised before any remote call.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong.
        reason: String,
    },
}

impl ChanwardError {
    /// Classify a settled call failure.
    pub fn from_slack(operation: impl Into<String>, attempts: u32, err: SlackError) -> Self {
        let operation = operation.into();
        match err {
            SlackError::RateLimited { retry_after_ms } => Self::RateLimited {
                operation,
                attempts,
                retry_after: Duration::from_millis(retry_after_ms),
            },
            SlackError::MissingScope { needed, .. } => Self::MissingPermission {
                scope: needed,
                action: operation,
            },
            SlackError::NotFound { error, .. } => Self::NotFound {
                what: format!("{operation} ({error})"),
            },
            SlackError::NotInChannel { channel } => Self::NotFound {
                what: format!("{operation} (bot cannot see channel {channel})"),
            },
            other => Self::Transient {
                operation,
                attempts,
                source: other,
            },
        }
    }

    /// Shorthand for [`ChanwardError::ConfigInvalid`].
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the whole run rather than one channel.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::MissingPermission { .. } | Self::ConfigInvalid { .. }
        )
    }

    /// A concrete next step for the operator.
    pub fn remediation(&self) -> String {
        match self {
            Self::RateLimited { retry_after, .. } => format!(
                "Slack is throttling this token; wait at least {}s and re-run. \
                 Larger --warn-after/--archive-after values reduce the number of calls per run.",
                retry_after.as_secs().max(1)
            ),
            Self::MissingPermission { scope, action } => format!(
                "add the `{scope}` bot token scope under OAuth & Permissions, reinstall the app \
                 to the workspace, and re-run (needed to {action})"
            ),
            Self::NotFound { .. } => {
                "the channel or user was deleted or is not visible to the bot; it was skipped"
                    .into()
            }
            Self::Transient { .. } => {
                "the Slack API call failed; re-run, or pass --verbose for request details".into()
            }
            Self::ConfigInvalid { .. } => {
                "fix the flag or config file value and re-run; no Slack calls were made".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slack_error_display() {
        let err = SlackError::MissingScope {
            method: "conversations.history".into(),
            needed: "channels:history".into(),
        };
        assert_eq!(
            err.to_string(),
            "conversations.history requires the `channels:history` scope"
        );
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let limited = SlackError::RateLimited {
            retry_after_ms: 1500,
        };
        assert_eq!(limited.retry_after(), Some(Duration::from_millis(1500)));
        assert_eq!(SlackError::Http("reset".into()).retry_after(), None);
    }

    #[test]
    fn missing_scope_becomes_missing_permission() {
        let err = ChanwardError::from_slack(
            "read history of #general",
            1,
            SlackError::MissingScope {
                method: "conversations.history".into(),
                needed: "channels:history".into(),
            },
        );
        match &err {
            ChanwardError::MissingPermission { scope, action } => {
                assert_eq!(scope, "channels:history");
                assert_eq!(action, "read history of #general");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_fatal());
        assert!(err.remediation().contains("channels:history"));
    }

    #[test]
    fn rate_limited_carries_attempts_and_wait() {
        let err = ChanwardError::from_slack(
            "list channels",
            3,
            SlackError::RateLimited {
                retry_after_ms: 60_000,
            },
        );
        assert!(matches!(
            err,
            ChanwardError::RateLimited { attempts: 3, .. }
        ));
        assert!(err.is_fatal());
        assert!(err.remediation().contains("60s"));
    }

    #[test]
    fn not_in_channel_is_not_found_and_not_fatal() {
        let err = ChanwardError::from_slack(
            "post warning",
            1,
            SlackError::NotInChannel {
                channel: "C123".into(),
            },
        );
        assert!(matches!(err, ChanwardError::NotFound { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn other_errors_are_transient_with_context() {
        let err = ChanwardError::from_slack(
            "archive #old",
            2,
            SlackError::Api {
                method: "conversations.archive".into(),
                error: "internal_error".into(),
            },
        );
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "archive #old failed after 2 attempt(s): conversations.archive failed: internal_error"
        );
    }

    #[test]
    fn config_errors_are_fatal() {
        let err = ChanwardError::config("warn threshold must be positive");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "invalid config: warn threshold must be positive"
        );
    }
}
