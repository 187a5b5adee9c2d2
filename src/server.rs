use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    api::{self, AppState},
    config, error, info,
    types::PkceToken,
};

/// Routes of the cover backend.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/playlists/{user_id}", get(api::playlists))
        .route("/tracks/{playlist_id}", get(api::tracks))
        .route("/thumbnail/{creation_method}", post(api::thumbnail))
        .route("/upload-playlist-image", post(api::upload_playlist_image))
        .layer(Extension(state))
}

fn bind_addr() -> SocketAddr {
    match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    }
}

/// Serves the cover backend until the process is stopped.
pub async fn start_api_server(state: Arc<AppState>) {
    let addr = bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    info!("Listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, router(state)).await {
        error!("Server stopped: {}", e);
    }
}

/// Serves the OAuth callback for the PKCE flow of `sporlcover auth`.
pub async fn start_callback_server(state: Arc<Mutex<Option<PkceToken>>>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Callback server stopped: {}", e);
    }
}
