// src/config.rs
//! Run configuration: optional TOML/JSON file plus environment fallbacks.
//! CLI flags always win; resolution order is flag > env > file > default.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::forum::{ForumCredentials, DEFAULT_USER_AGENT};

pub const ENV_CONFIG_PATH: &str = "MARKET_DIGEST_CONFIG";
pub const ENV_FORUM_CLIENT_ID: &str = "FORUM_CLIENT_ID";
pub const ENV_FORUM_CLIENT_SECRET: &str = "FORUM_CLIENT_SECRET";
pub const ENV_FORUM_USER_AGENT: &str = "FORUM_USER_AGENT";

const DEFAULT_TOML_PATH: &str = "config/market_digest.toml";
const DEFAULT_JSON_PATH: &str = "config/market_digest.json";

/// Settings readable from a config file. Everything is optional; the CLI can
/// run entirely without one.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub output: Option<PathBuf>,
    pub days_ahead: Option<u32>,
    pub handles: Vec<String>,
    pub forums: Vec<String>,
    pub forum_users: Vec<String>,
    pub forum_client_id: Option<String>,
    pub forum_client_secret: Option<String>,
    pub forum_user_agent: Option<String>,
    pub econ_api_key: Option<String>,
    pub countries: Vec<String>,
    pub importance: Vec<String>,
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<FileConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load config using env var + fallbacks:
/// 1) $MARKET_DIGEST_CONFIG
/// 2) config/market_digest.toml
/// 3) config/market_digest.json
/// No file found means an empty config, not an error.
pub fn load_default() -> Result<FileConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(FileConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FileConfig> {
    // Try TOML first if hinted, else JSON first; fall back to the other.
    if hint_ext == "toml" {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    if hint_ext != "toml" {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported config format"))
}

/// Trim entries, drop empties, dedup (sorted).
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() {
            set.insert(t.to_string());
        }
    }
    set.into_iter().collect()
}

/// One setting through the precedence chain: flag > env > file.
pub fn resolve_setting(
    flag: Option<String>,
    env_key: &str,
    file_value: Option<String>,
) -> Option<String> {
    flag.filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var(env_key).ok().filter(|s| !s.trim().is_empty()))
        .or_else(|| file_value.filter(|s| !s.trim().is_empty()))
}

/// Credentials become `Some` only when both id and secret resolved; the
/// caller decides how to report a watchlist with missing credentials.
pub fn resolve_forum_credentials(
    flag_id: Option<String>,
    flag_secret: Option<String>,
    flag_user_agent: Option<String>,
    file: &FileConfig,
) -> Option<ForumCredentials> {
    let client_id = resolve_setting(flag_id, ENV_FORUM_CLIENT_ID, file.forum_client_id.clone())?;
    let client_secret = resolve_setting(
        flag_secret,
        ENV_FORUM_CLIENT_SECRET,
        file.forum_client_secret.clone(),
    )?;
    let user_agent = resolve_setting(
        flag_user_agent,
        ENV_FORUM_USER_AGENT,
        file.forum_user_agent.clone(),
    )
    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Some(ForumCredentials {
        client_id,
        client_secret,
        user_agent,
    })
}
