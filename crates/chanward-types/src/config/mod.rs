//! Configuration schema.
//!
//! The config file is optional JSON; every field has a default and every
//! lifecycle field can be overridden on the command line. Keys may be
//! written in camelCase or snake_case.
//!
//! ```json
//! {
//!   "slack": { "botTokenEnv": "SLACK_BOT_TOKEN" },
//!   "lifecycle": {
//!     "warnAfter": "30d",
//!     "archiveAfter": "14d",
//!     "excludeChannels": "#general,random",
//!     "excludePrefixes": "ext-,#ops-",
//!     "announceChannel": "#new-channels"
//!   }
//! }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::secret::SecretString;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Slack connection settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Thresholds, exclusions and announcement defaults.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Slack connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`). Prefer `bot_token_env` over storing it here.
    #[serde(default, alias = "botToken")]
    pub bot_token: SecretString,

    /// Environment variable consulted when `bot_token` is empty.
    #[serde(default = "default_token_env", alias = "botTokenEnv")]
    pub bot_token_env: String,

    /// Override for the Web API base URL.
    #[serde(default, alias = "apiBaseUrl")]
    pub api_base_url: Option<String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: SecretString::default(),
            bot_token_env: default_token_env(),
            api_base_url: None,
        }
    }
}

impl SlackConfig {
    /// The configured token, falling back to the `bot_token_env` variable.
    pub fn resolve_token(&self) -> Option<SecretString> {
        if !self.bot_token.is_empty() {
            return Some(self.bot_token.clone());
        }
        std::env::var(&self.bot_token_env)
            .ok()
            .map(SecretString::from)
            .filter(|t| !t.is_empty())
    }
}

/// Lifecycle defaults. Durations use the `30d` / `12h` / `45s` syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Inactivity before a warning is posted.
    #[serde(default = "default_warn_after", alias = "warnAfter")]
    pub warn_after: String,

    /// Grace period after a warning before archival.
    #[serde(default = "default_archive_after", alias = "archiveAfter")]
    pub archive_after: String,

    /// Comma-separated channel names that are never warned or archived.
    #[serde(default, alias = "excludeChannels")]
    pub exclude_channels: String,

    /// Comma-separated name prefixes that are never warned or archived.
    #[serde(default, alias = "excludePrefixes")]
    pub exclude_prefixes: String,

    /// Channel that receives new-channel announcements.
    #[serde(default, alias = "announceChannel")]
    pub announce_channel: Option<String>,

    /// How far back `detect` looks for newly created channels.
    #[serde(default = "default_new_channel_window", alias = "newChannelWindow")]
    pub new_channel_window: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            warn_after: default_warn_after(),
            archive_after: default_archive_after(),
            exclude_channels: String::new(),
            exclude_prefixes: String::new(),
            announce_channel: None,
            new_channel_window: default_new_channel_window(),
        }
    }
}

fn default_token_env() -> String {
    "SLACK_BOT_TOKEN".into()
}
fn default_warn_after() -> String {
    "30d".into()
}
fn default_archive_after() -> String {
    "30d".into()
}
fn default_new_channel_window() -> String {
    "1d".into()
}
