//! Slack Web API access for chanward.
//!
//! # Modules
//!
//! - [`traits`] -- the [`SlackApi`] trait every caller programs against
//! - [`api`] -- [`SlackApiClient`], the reqwest implementation
//! - [`wire`] -- response payloads and their conversion to domain types
//! - [`gateway`] -- bounded retry on rate limits, per-call deadlines, and
//!   [`GatedSlack`], the facade the lifecycle pipelines use
//!
//! Every remote call made by the pipelines goes through [`GatedSlack`], so
//! rate-limit handling and error classification live in one place.

pub mod api;
pub mod gateway;
pub mod traits;
pub mod wire;

pub use api::SlackApiClient;
pub use gateway::{GatedSlack, Gateway, RetryPolicy};
pub use traits::{Page, SlackApi};
