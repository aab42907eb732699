//! # chanward-types
//!
//! Core type definitions for chanward, the Slack channel lifecycle tool.
//!
//! Every other chanward crate depends on this one. It contains:
//!
//! - **[`error`]** -- [`SlackError`] (one remote call) and [`ChanwardError`]
//!   (what the gateway and pipelines report to the operator)
//! - **[`channel`]** -- channels, history messages and the bot identity
//! - **[`threshold`]** -- warn/archive thresholds and human duration parsing
//! - **[`config`]** -- configuration schema and config-file discovery
//! - **[`secret`]** -- the redacting token wrapper

pub mod channel;
pub mod config;
pub mod error;
pub mod secret;
pub mod threshold;

pub use channel::{BotIdentity, Channel, HistoryMessage, User};
pub use error::{ChanwardError, SlackError};
pub use threshold::Thresholds;
