use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::StatusCode};

use crate::{types::SimplifiedPlaylist, warning};

use super::{ApiError, AppState};

pub async fn playlists(
    Path(user_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<SimplifiedPlaylist>>, ApiError> {
    let token = state
        .app_token
        .get_valid_token(&state.http)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, "Spotify authentication failed").with_detail(e))?;

    match state.spotify.playlists(&token, &user_id).await {
        Ok(playlists) => Ok(Json(playlists)),
        Err(e) => {
            warning!("Failed to fetch playlists of {}: {}", user_id, e);
            Err(spotify_error(e, "Failed to fetch playlists"))
        }
    }
}

/// Forward Spotify's status where there is one, 502 otherwise.
pub(super) fn spotify_error(err: reqwest::Error, message: &str) -> ApiError {
    let status = err
        .status()
        .and_then(|status| StatusCode::from_u16(status.as_u16()).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    ApiError::new(status, message).with_detail(err)
}
