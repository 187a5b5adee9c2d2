use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::StatusCode};

use crate::{types::SimplifiedTrack, warning};

use super::{ApiError, AppState, playlists::spotify_error};

pub async fn tracks(
    Path(playlist_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<SimplifiedTrack>>, ApiError> {
    let token = state
        .app_token
        .get_valid_token(&state.http)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, "Spotify authentication failed").with_detail(e))?;

    match state.spotify.playlist_tracks(&token, &playlist_id).await {
        Ok(tracks) => Ok(Json(tracks)),
        Err(e) => {
            warning!("Failed to fetch tracks of {}: {}", playlist_id, e);
            Err(spotify_error(e, "Failed to fetch tracks"))
        }
    }
}
