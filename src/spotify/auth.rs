use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::TokenManager,
    server::start_callback_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// Runs the OAuth 2.0 PKCE flow and persists the resulting user token.
///
/// The user token is what the cover upload needs: Spotify only accepts
/// `PUT /playlists/{id}/images` with the `ugc-image-upload` scope granted
/// by the playlist owner.
///
/// # Authentication Flow
///
/// 1. **PKCE Setup**: Generates a code verifier and its SHA256 challenge
/// 2. **Server Start**: Launches the local callback server
/// 3. **Browser Launch**: Opens the Spotify authorization URL
/// 4. **Callback Handling**: The callback exchanges the code for a token
/// 5. **Token Persistence**: Token is saved for later uploads
///
/// # Error Handling
///
/// - Browser launch failures result in a warning with the URL to open manually
/// - Missing client id, persistence failures and timeouts terminate the program
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let client_id = match config::spotify_client_id() {
        Ok(id) => id,
        Err(e) => error!("{}", e),
    };

    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    // start callback server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_callback_server(server_state).await;
    });

    let auth_url = format!(
        "{spotify_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        spotify_auth_url = &config::spotify_apiauth_url(),
        client_id = client_id,
        redirect_uri = &config::spotify_redirect_uri(),
        code_challenge = code_challenge,
        scope = &config::spotify_scope().replace(' ', "%20")
    );

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            token: None,
        });
    }

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(t) => {
            let token_manager = TokenManager::new(t);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Polls the shared state once per second for up to 60 seconds until the
/// callback handler has stored a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a fresh access token.
///
/// Spotify may or may not rotate the refresh token; when the response omits
/// it the previous one is kept.
pub async fn refresh_token(refresh_token: &str) -> Result<Token, String> {
    let client_id = config::spotify_client_id()?;
    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id.as_str()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    let mut token = token_from_json(&json)?;
    if token.refresh_token.is_empty() {
        token.refresh_token = refresh_token.to_string();
    }
    Ok(token)
}

/// Completes the PKCE flow by exchanging the authorization code.
///
/// The code is single-use and expires quickly, so this runs straight from
/// the callback handler.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, String> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    token_from_json(&json)
}

/// Requests an application token with the client credentials grant.
///
/// Such a token carries no user context; it is enough to read public
/// playlists and their tracks but cannot change covers.
pub async fn client_credentials_token(client: &Client) -> Result<Token, String> {
    let client_id = config::spotify_client_id()?;
    let client_secret = config::spotify_client_secret()?;

    let res = client
        .post(config::spotify_apitoken_url())
        .basic_auth(client_id, Some(client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    token_from_json(&json)
}

/// Builds a [`Token`] from a token endpoint response.
///
/// # Errors
///
/// Fails when the response carries no access token, forwarding the
/// endpoint's `error_description` if present.
pub fn token_from_json(json: &Value) -> Result<Token, String> {
    let Some(access_token) = json["access_token"].as_str() else {
        return Err(json["error_description"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .unwrap_or("token response without access_token")
            .to_string());
    };

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
