//! User ID -> display name lookup for reports.
//!
//! Loading is best-effort. A workspace where the bot lacks `users:read`
//! still gets a report, with raw user IDs in place of names.

use std::collections::HashMap;

use tracing::{debug, warn};

use chanward_slack::GatedSlack;
use chanward_types::User;

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            names: users
                .into_iter()
                .filter(|u| !u.display_name.is_empty())
                .map(|u| (u.id, u.display_name))
                .collect(),
        }
    }

    /// Fetch the member list, degrading to an empty directory on any error.
    pub async fn load(slack: &GatedSlack) -> Self {
        match slack.users().await {
            Ok(users) => {
                let dir = Self::from_users(users);
                debug!(count = dir.len(), "loaded user directory");
                dir
            }
            Err(e) => {
                warn!(error = %e, hint = %e.remediation(), "user list unavailable, reports will show raw user IDs");
                Self::default()
            }
        }
    }

    /// Display name for `id`, or `id` itself when unknown.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.resolve(id).unwrap_or(id)
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
