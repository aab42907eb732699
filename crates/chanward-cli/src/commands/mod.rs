//! CLI command implementations for `chanward`.
//!
//! - [`inactive`] -- the inactive-channel sweep.
//! - [`detect`] -- new-channel announcements.
//!
//! Both commands validate every flag and config value before the first
//! Slack call.

pub mod detect;
pub mod inactive;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use chanward_core::ExclusionSet;
use chanward_slack::{GatedSlack, Gateway, SlackApiClient};
use chanward_types::ChanwardError;
use chanward_types::config::loader;
use chanward_types::config::{Config, LifecycleConfig, SlackConfig};

/// Load configuration from the `--config` override or via auto-discovery.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<Config> {
    Ok(loader::load_config(config_override.map(Path::new))?)
}

/// Build the gated Slack client. Fails without a remote call when no token
/// is configured.
pub fn connect(cfg: &SlackConfig) -> Result<GatedSlack, ChanwardError> {
    let token = cfg.resolve_token().ok_or_else(|| {
        ChanwardError::config(format!(
            "no Slack bot token: set {} or slack.botToken in the config file",
            cfg.bot_token_env
        ))
    })?;
    let client = match &cfg.api_base_url {
        Some(url) => SlackApiClient::with_base_url(token, url.clone()),
        None => SlackApiClient::new(token),
    };
    debug!(base_url = client.base_url(), "slack client ready");
    Ok(GatedSlack::new(Arc::new(client), Gateway::default()))
}

/// Exclusions from flags, falling back to the config file per list.
pub fn exclusions(
    lifecycle: &LifecycleConfig,
    names: Option<&str>,
    prefixes: Option<&str>,
) -> ExclusionSet {
    ExclusionSet::parse(
        names.unwrap_or(&lifecycle.exclude_channels),
        prefixes.unwrap_or(&lifecycle.exclude_prefixes),
    )
}
