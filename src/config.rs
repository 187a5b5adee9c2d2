//! Configuration management for the playlist cover backend.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::cover::{DEFAULT_ATTEMPT_TIMEOUT, Ladder};

/// Loads environment variables from `sporlcover/.env` in the local data directory.
///
/// Creates the directory if it does not exist yet. A missing `.env` file is
/// not an error, the process environment may already carry every value.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sporlcover/.env`
/// - macOS: `~/Library/Application Support/sporlcover/.env`
/// - Windows: `%LOCALAPPDATA%/sporlcover/.env`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file exists
/// but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Root of everything the application persists locally.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlcover");
    path
}

fn required(key: &str) -> Result<String, String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("{} must be set", key)),
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the backend (and the OAuth callback server) binds to.
pub fn server_addr() -> String {
    or_default("SERVER_ADDRESS", "0.0.0.0:8080")
}

/// Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

pub fn spotify_apiauth_url() -> String {
    or_default(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

pub fn spotify_apitoken_url() -> String {
    or_default(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

pub fn spotify_client_id() -> Result<String, String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Client secret used for the client credentials grant.
///
/// # Security Note
///
/// Never log this value.
pub fn spotify_client_secret() -> Result<String, String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

pub fn spotify_redirect_uri() -> String {
    or_default(
        "SPOTIFY_API_REDIRECT_URI",
        "http://127.0.0.1:8080/callback",
    )
}

/// Scopes requested in the PKCE flow; cover upload needs `ugc-image-upload`.
pub fn spotify_scope() -> String {
    or_default(
        "SPOTIFY_API_AUTH_SCOPE",
        "ugc-image-upload playlist-read-private playlist-modify-public playlist-modify-private",
    )
}

pub fn openai_apiurl() -> String {
    or_default("OPENAI_API_URL", "https://api.openai.com/v1")
}

pub fn openai_api_key() -> Result<String, String> {
    required("OPENAI_API_KEY")
}

/// Ceilings trialed when uploading a cover, e.g. `55,50,45`.
pub fn upload_ladder() -> Result<Ladder, String> {
    match env::var("COVER_UPLOAD_LADDER") {
        Ok(value) if !value.trim().is_empty() => value.parse().map_err(|e| {
            format!("COVER_UPLOAD_LADDER is invalid: {}", e)
        }),
        _ => Ok(Ladder::default()),
    }
}

pub fn upload_timeout() -> Duration {
    env::var("COVER_UPLOAD_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT)
}

/// Whether generated images and request bodies are written to the audit log.
pub fn audit_log_enabled() -> bool {
    matches!(
        or_default("COVER_AUDIT_LOG", "false")
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}
