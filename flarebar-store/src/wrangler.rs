//! Wrangler config-file fallback.
//!
//! When no profile is active, credential resolution falls back to the config
//! file the wrangler CLI writes after `wrangler login`. The file is a simple
//! `key = "value"` format; only `oauth_token`, `api_token`, and `account_id`
//! are extracted. Everything here is best-effort: unreadable files move on
//! to the next candidate and malformed lines are skipped silently.

use flarebar_core::Credentials;
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Relative location of the config file inside each candidate root.
const CONFIG_RELATIVE: &str = ".wrangler/config/default.toml";

/// Ordered candidate paths for the wrangler config file.
///
/// 1. Platform preferences directory (macOS keeps it under
///    `~/Library/Preferences`)
/// 2. Home-directory dotfile
/// 3. `$XDG_CONFIG_HOME`
/// 4. `~/.config`
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let home = dirs::home_dir();

    #[cfg(target_os = "macos")]
    if let Some(home) = &home {
        paths.push(home.join("Library").join("Preferences").join(CONFIG_RELATIVE));
    }

    if let Some(home) = &home {
        paths.push(home.join(CONFIG_RELATIVE));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            paths.push(PathBuf::from(xdg).join(CONFIG_RELATIVE));
        }
    }

    if let Some(home) = &home {
        paths.push(home.join(".config").join(CONFIG_RELATIVE));
    }

    paths
}

/// Reads the first candidate config that yields at least one token.
pub fn read_config() -> Option<Credentials> {
    read_config_from(&candidate_paths())
}

/// Reads the first of `paths` that yields at least one token.
pub fn read_config_from(paths: &[PathBuf]) -> Option<Credentials> {
    for path in paths {
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };

        let creds = parse_config(&content);
        if creds.is_authenticated() {
            debug!(path = %path.display(), "Using wrangler config credentials");
            return Some(creds);
        }
    }
    None
}

/// Parses `key = "value"` lines, tolerating single and double quotes and
/// trailing `#` comments. Lines that don't fit the format are skipped.
pub fn parse_config(content: &str) -> Credentials {
    let mut creds = Credentials::default();

    for line in content.lines() {
        let Some((key, value)) = parse_line(line) else {
            continue;
        };

        match key {
            "oauth_token" => creds.oauth_token = Some(value),
            "api_token" => creds.api_token = Some(value),
            "account_id" => creds.account_id = Some(value),
            _ => {}
        }
    }

    creds
}

fn parse_line(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, raw_value) = line.split_once('=')?;
    let value = parse_value(raw_value)?;
    Some((key.trim(), value))
}

fn parse_value(raw: &str) -> Option<String> {
    let raw = raw.trim();

    // Quoted: take everything up to the matching close quote; anything after
    // (including a comment) is ignored.
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            return rest.find(quote).map(|end| rest[..end].to_string());
        }
    }

    // Bare: cut at a trailing comment.
    let bare = raw.split('#').next().unwrap_or_default().trim();
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
