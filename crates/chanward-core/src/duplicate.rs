//! Prior-announcement detection.
//!
//! Before announcing new channels, the recent history of the announcement
//! channel is checked for bot messages that already reference them. Three
//! reference forms are recognized: `<#C123>`, `<#C123|name>` and a plain
//! `#name`.
//!
//! Failure policy: permission, not-found and rate-limit failures
//! propagate. Only transient failures degrade to "nothing announced yet",
//! at the cost of a possible duplicate post.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use chanward_slack::GatedSlack;
use chanward_types::{BotIdentity, Channel, ChanwardError, HistoryMessage};

static CHANNEL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<#([A-Z0-9]+)(?:\|([^>]*))?>|(?:^|[^\w&/])#([\w-]+)")
        .expect("channel reference pattern is valid")
});

/// One channel reference found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `<#C123>` or `<#C123|name>`.
    Id { id: String, name: Option<String> },
    /// Plain `#name`.
    Name(String),
}

impl ChannelRef {
    pub fn refers_to(&self, channel: &Channel) -> bool {
        match self {
            Self::Id { id, name } => {
                *id == channel.id || name.as_deref().is_some_and(|n| n == channel.name)
            }
            Self::Name(name) => *name == channel.name,
        }
    }
}

/// Every channel reference in `text`, in order of appearance.
pub fn channel_refs(text: &str) -> Vec<ChannelRef> {
    CHANNEL_REF
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(id) = caps.get(1) {
                Some(ChannelRef::Id {
                    id: id.as_str().to_owned(),
                    name: caps
                        .get(2)
                        .map(|n| n.as_str().to_owned())
                        .filter(|n| !n.is_empty()),
                })
            } else {
                caps.get(3).map(|n| ChannelRef::Name(n.as_str().to_owned()))
            }
        })
        .collect()
}

/// Names of `candidates` already referenced by one of `bot`'s messages.
pub fn already_announced(
    messages: &[HistoryMessage],
    bot: &BotIdentity,
    candidates: &[Channel],
) -> BTreeSet<String> {
    let refs: Vec<ChannelRef> = messages
        .iter()
        .filter(|m| bot.authored(m))
        .flat_map(|m| channel_refs(&m.text))
        .collect();

    candidates
        .iter()
        .filter(|c| refs.iter().any(|r| r.refers_to(c)))
        .map(|c| c.name.clone())
        .collect()
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateCheck {
    /// Candidate names that were already announced.
    pub announced: BTreeSet<String>,
    /// Whether the check degraded after a transient failure.
    pub degraded: bool,
}

pub struct DuplicateDetector<'a> {
    slack: &'a GatedSlack,
    bot: &'a BotIdentity,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(slack: &'a GatedSlack, bot: &'a BotIdentity) -> Self {
        Self { slack, bot }
    }

    /// Check the announcement channel's recent history for `candidates`.
    pub async fn check(
        &self,
        announce: &Channel,
        candidates: &[Channel],
    ) -> Result<DuplicateCheck, ChanwardError> {
        match self.slack.history(announce, crate::HISTORY_CEILING).await {
            Ok(messages) => Ok(DuplicateCheck {
                announced: already_announced(&messages, self.bot, candidates),
                degraded: false,
            }),
            Err(e @ ChanwardError::Transient { .. }) => {
                warn!(
                    channel = %announce.display_name(),
                    error = %e,
                    "duplicate check failed, assuming nothing was announced yet"
                );
                Ok(DuplicateCheck {
                    announced: BTreeSet::new(),
                    degraded: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}
