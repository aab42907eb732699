//! The warn/archive state machine.
//!
//! A pure function of `(now, created, last_activity, marker sent_at)` and
//! the thresholds. No I/O and no hidden state, so every transition is
//! testable with synthetic timestamps.
//!
//! ```text
//!   ACTIVE ──(idle > warn_after, no marker)──> PENDING_WARNING ──warn──> WARNED
//!     ▲                                                                    │
//!     └──────(marker scrolls out of the history window)────────────────────┤
//!                                                                          │
//!                                     (marker age > archive_after)         ▼
//!                                                                     ARCHIVABLE
//! ```
//!
//! Rules, in precedence order:
//! 1. Channels created less than `warn_after` ago are never evaluated.
//! 2. With a marker: older than `archive_after` is archivable, otherwise the
//!    grace period is still open. Activity after the marker does not cancel
//!    it; the marker governs until it leaves the history window.
//! 3. Without a marker: idle longer than `warn_after` triggers a warning.
//!    A last activity earlier than creation is treated as too new.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use chanward_types::Thresholds;

/// Inferred position of a channel in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    PendingWarning,
    Warned,
    Archivable,
}

impl LifecycleState {
    /// The action this state calls for in the current run.
    pub fn decision(self) -> Decision {
        match self {
            Self::Active | Self::Warned => Decision::None,
            Self::PendingWarning => Decision::Warn,
            Self::Archivable => Decision::Archive,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::PendingWarning => "pending warning",
            Self::Warned => "warned",
            Self::Archivable => "archivable",
        })
    }
}

/// What to do with a channel this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    None,
    Warn,
    Archive,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Warn => "warn",
            Self::Archive => "archive",
        })
    }
}

/// The facts the state machine needs about one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub created: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub marker_sent_at: Option<DateTime<Utc>>,
}

/// Whether `created` falls inside the `window` ending at `now`. A window
/// reaching past the representable calendar covers everything.
pub fn created_within(created: DateTime<Utc>, window: TimeDelta, now: DateTime<Utc>) -> bool {
    now.checked_sub_signed(window).is_none_or(|cutoff| created > cutoff)
}

/// Infer the channel's state.
pub fn infer_state(obs: &Observation, thresholds: &Thresholds, now: DateTime<Utc>) -> LifecycleState {
    if created_within(obs.created, thresholds.warn_after, now) {
        return LifecycleState::Active;
    }

    if let Some(sent_at) = obs.marker_sent_at {
        return if now - sent_at > thresholds.archive_after {
            LifecycleState::Archivable
        } else {
            LifecycleState::Warned
        };
    }

    if obs.last_activity < obs.created {
        return LifecycleState::Active;
    }

    if now - obs.last_activity > thresholds.warn_after {
        LifecycleState::PendingWarning
    } else {
        LifecycleState::Active
    }
}

/// Decide what to do with the channel this run.
pub fn classify(obs: &Observation, thresholds: &Thresholds, now: DateTime<Utc>) -> Decision {
    infer_state(obs, thresholds, now).decision()
}
