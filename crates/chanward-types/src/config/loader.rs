//! Config file discovery and loading.
//!
//! Discovery order:
//! 1. An explicit path (the `--config` flag).
//! 2. The `CHANWARD_CONFIG` environment variable.
//! 3. `~/.chanward/config.json`.
//!
//! When nothing is found the defaults are used. An explicit path that does
//! not exist is an error; a discovered one that does not exist is not.
//! JSON keys are normalized from camelCase to snake_case before
//! deserialization.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::Config;
use crate::error::ChanwardError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CHANWARD_CONFIG";

/// Resolve the config path from the env override or the home directory.
pub fn discover_config_path(env_path: Option<String>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = env_path.filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(p));
    }
    home_dir.map(|home| home.join(".chanward").join("config.json"))
}

/// Load configuration, honouring an explicit path first.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ChanwardError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ChanwardError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return read_config(path);
    }

    let Some(path) = discover_config_path(std::env::var(CONFIG_ENV).ok(), dirs::home_dir()) else {
        info!("no home directory or {CONFIG_ENV}, using defaults");
        return Ok(Config::default());
    };

    if !path.exists() {
        debug!(path = %path.display(), "config file absent, using defaults");
        return Ok(Config::default());
    }
    read_config(&path)
}

fn read_config(path: &Path) -> Result<Config, ChanwardError> {
    debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ChanwardError::config(format!("failed to read {}: {e}", path.display()))
    })?;
    let raw: Value = serde_json::from_str(&contents).map_err(|e| {
        ChanwardError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    serde_json::from_value(normalize_keys(raw))
        .map_err(|e| ChanwardError::config(format!("{}: {e}", path.display())))
}

/// Convert camelCase object keys to snake_case, recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_to_snake(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// `"warnAfter"` -> `"warn_after"`, `"apiBaseURL"` -> `"api_base_url"`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn camel_to_snake_cases() {
        assert_eq!(camel_to_snake("warnAfter"), "warn_after");
        assert_eq!(camel_to_snake("botTokenEnv"), "bot_token_env");
        assert_eq!(camel_to_snake("apiBaseURL"), "api_base_url");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn normalize_nested_objects() {
        let v = normalize_keys(json!({ "lifecycle": { "excludeChannels": "a,b" } }));
        assert_eq!(v["lifecycle"]["exclude_channels"], "a,b");
    }

    #[test]
    fn env_path_takes_precedence() {
        let p = discover_config_path(Some("/etc/chanward.json".into()), Some("/home/x".into()));
        assert_eq!(p, Some(PathBuf::from("/etc/chanward.json")));
    }

    #[test]
    fn home_fallback() {
        let p = discover_config_path(None, Some(PathBuf::from("/home/x")));
        assert_eq!(p, Some(PathBuf::from("/home/x/.chanward/config.json")));
        assert_eq!(discover_config_path(Some("  ".into()), None), None);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/chanward/config.json"))).unwrap_err();
        assert!(matches!(err, ChanwardError::ConfigInvalid { .. }));
    }

    #[test]
    fn explicit_file_is_loaded_and_normalized() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "lifecycle": {{ "warnAfter": "45d", "announceChannel": "new-stuff" }} }}"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.lifecycle.warn_after, "45d");
        assert_eq!(cfg.lifecycle.archive_after, "30d");
        assert_eq!(cfg.lifecycle.announce_channel.as_deref(), Some("new-stuff"));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
