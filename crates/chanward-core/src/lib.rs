//! Channel lifecycle engine for chanward.
//!
//! Nothing here keeps state between runs. A channel's position in the
//! warn/archive state machine is reconstructed each time from its recent
//! message history: the only durable record that a channel was warned is
//! the warning message itself, tagged with a hidden marker.
//!
//! # Architecture
//!
//! ```text
//!                    GatedSlack (rate-limited gateway)
//!                 ┌──────────┼───────────────┐
//!                 │          │               │
//!        ActivityScanner  DuplicateDetector  Executor
//!                 │          │               │
//!   ExclusionSet ─┤          │               │
//!                 ▼          ▼               │
//!           lifecycle::classify ──> sweep / announce ──> reports
//! ```
//!
//! - [`exclusion`] -- protected channel names and prefixes
//! - [`marker`] -- the hidden warning marker
//! - [`scanner`] -- history -> last activity, marker, last message
//! - [`lifecycle`] -- the pure warn/archive state machine
//! - [`duplicate`] -- prior-announcement detection
//! - [`executor`] -- warnings, archival notices, archive calls
//! - [`users`] -- user ID -> display name
//! - [`sweep`] -- the inactive-channel pipeline
//! - [`announce`] -- the new-channel pipeline

pub mod announce;
pub mod duplicate;
pub mod exclusion;
pub mod executor;
pub mod lifecycle;
pub mod marker;
pub mod scanner;
pub mod sweep;
pub mod users;

pub use exclusion::ExclusionSet;
pub use lifecycle::{Decision, LifecycleState, Observation};

/// Upstream ceiling on history reads for non-privileged apps.
pub const HISTORY_CEILING: u32 = 15;
