use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config, spotify, types::Token};

/// Seconds before expiry at which a token is treated as stale.
const EXPIRY_BUFFER_SECS: u64 = 240;

fn is_expired(token: &Token) -> bool {
    let now = Utc::now().timestamp() as u64;
    now + EXPIRY_BUFFER_SECS >= token.obtained_at + token.expires_in
}

/// User token obtained through the PKCE flow, cached on disk.
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let content = async_fs::read_to_string(Self::token_path())
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Access token, refreshed and persisted first if it is about to expire.
    pub async fn get_valid_token(&mut self) -> Result<String, String> {
        if is_expired(&self.token) {
            self.token = spotify::auth::refresh_token(&self.token.refresh_token).await?;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}

/// Application token from the client credentials grant, cached in memory
/// and shared between request handlers.
#[derive(Default)]
pub struct AppTokenManager {
    token: Mutex<Option<Token>>,
}

impl AppTokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_valid_token(&self, client: &Client) -> Result<String, String> {
        let mut lock = self.token.lock().await;
        if let Some(token) = lock.as_ref().filter(|token| !is_expired(token)) {
            return Ok(token.access_token.clone());
        }

        let token = spotify::auth::client_credentials_token(client).await?;
        let access_token = token.access_token.clone();
        *lock = Some(token);
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            scope: String::new(),
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn test_fresh_token_is_not_expired() {
        let now = Utc::now().timestamp() as u64;
        assert!(!is_expired(&token(now, 3600)));
    }

    #[test]
    fn test_token_inside_buffer_is_expired() {
        let now = Utc::now().timestamp() as u64;
        assert!(is_expired(&token(now, 200)));
        assert!(is_expired(&token(now - 3600, 3600)));
    }

    #[tokio::test]
    async fn test_app_token_served_from_cache() {
        let manager = AppTokenManager::new();
        let now = Utc::now().timestamp() as u64;
        *manager.token.lock().await = Some(token(now, 3600));

        // A valid cached token never touches the network
        let client = Client::new();
        assert_eq!(manager.get_valid_token(&client).await.unwrap(), "access");
    }
}
