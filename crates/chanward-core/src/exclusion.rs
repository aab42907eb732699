//! Protected channels.
//!
//! A channel is excluded when its name equals a configured name or starts
//! with a configured prefix. Matching is case-sensitive. One leading `#` is
//! stripped from channel names and configured entries before comparing.

use std::collections::BTreeSet;

/// Parsed exclusion lists. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
    prefixes: BTreeSet<String>,
}

impl ExclusionSet {
    /// Parse comma-separated name and prefix lists (`"#general, random"`).
    pub fn parse(names: &str, prefixes: &str) -> Self {
        Self {
            names: parse_list(names),
            prefixes: parse_list(prefixes),
        }
    }

    pub fn is_excluded(&self, channel_name: &str) -> bool {
        let name = strip_hash(channel_name);
        self.names.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.prefixes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

fn strip_hash(s: &str) -> &str {
    s.strip_prefix('#').unwrap_or(s)
}

fn parse_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|entry| strip_hash(entry.trim()).to_owned())
        .filter(|entry| !entry.is_empty())
        .collect()
}
