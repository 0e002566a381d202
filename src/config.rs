//! Credentials and preferences.
//!
//! Environment variables win over the config file, so CI and one-off
//! overrides need no file edits:
//!   GERRIT_HOST, GERRIT_USERNAME, GERRIT_HTTP_PASSWORD, GERRIT_AI_TOOL
//! The file lives at `~/.config/gerrit-cli/config.toml` and is written by
//! `gerrit setup` with owner-only permissions.

use std::fs;
use std::path::PathBuf;

use gerrit_api::ident::normalize_host;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Immutable after load; every component receives it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_tool: Option<String>,
    #[serde(default = "default_true")]
    pub ai_auto_detect: bool,
}

fn default_true() -> bool {
    true
}

/// `~/.config/gerrit-cli/config.toml`.
pub fn config_path() -> CliResult<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| CliError::Config("cannot determine the config directory".to_string()))?;
    Ok(base.join("gerrit-cli").join("config.toml"))
}

/// Load credentials: env overlay on top of the config file.
pub fn load() -> CliResult<Credentials> {
    let mut creds = load_file().ok();

    let env = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
    if let (Some(host), Some(username), Some(password)) = (
        env("GERRIT_HOST"),
        env("GERRIT_USERNAME"),
        env("GERRIT_HTTP_PASSWORD"),
    ) {
        creds = Some(Credentials {
            host,
            username,
            password,
            ai_tool: env("GERRIT_AI_TOOL").or(creds.as_ref().and_then(|c| c.ai_tool.clone())),
            ai_auto_detect: creds.as_ref().map(|c| c.ai_auto_detect).unwrap_or(true),
        });
    } else if let Some(c) = creds.as_mut() {
        // Partial env overrides on top of the file.
        if let Some(host) = env("GERRIT_HOST") {
            c.host = host;
        }
        if let Some(user) = env("GERRIT_USERNAME") {
            c.username = user;
        }
        if let Some(pass) = env("GERRIT_HTTP_PASSWORD") {
            c.password = pass;
        }
        if let Some(tool) = env("GERRIT_AI_TOOL") {
            c.ai_tool = Some(tool);
        }
    }

    let mut creds = creds.ok_or_else(|| {
        CliError::Config(
            "no credentials configured; run `gerrit setup` or set GERRIT_HOST, \
             GERRIT_USERNAME and GERRIT_HTTP_PASSWORD"
                .to_string(),
        )
    })?;

    if creds.username.trim().is_empty() {
        return Err(CliError::Config("username must not be empty".to_string()));
    }
    creds.host = normalize_host(&creds.host);
    Ok(creds)
}

fn load_file() -> CliResult<Credentials> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&raw).map_err(|e| CliError::Config(format!("bad config file: {e}")))
}

/// Persist credentials; directories are created as needed.
pub fn store(creds: &Credentials) -> CliResult<PathBuf> {
    let path = config_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let body = toml::to_string_pretty(creds)
        .map_err(|e| CliError::Config(format!("cannot serialize config: {e}")))?;
    fs::write(&path, body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(path)
}
