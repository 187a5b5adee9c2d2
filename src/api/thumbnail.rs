use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::StatusCode};
use serde_json::json;

use crate::{
    info,
    management::AuditLog,
    openai::CreationMethod,
    spotify,
    types::{ThumbnailRequest, ThumbnailResponse},
    warning,
};

use super::{ApiError, AppState};

pub async fn thumbnail(
    Path(creation_method): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<ThumbnailRequest>,
) -> Result<Json<ThumbnailResponse>, ApiError> {
    let method: CreationMethod = creation_method
        .parse()
        .map_err(|_| ApiError::bad_request("Creation method not permitted"))?;

    if request.tracks.is_empty() {
        return Err(ApiError::bad_request("Please select at least one track"));
    }

    info!(
        "Generating {} cover from {} track(s)",
        method,
        request.tracks.len()
    );

    let image_url = state
        .openai
        .generate(
            method,
            &request.tracks,
            &request.mood,
            request.playlist_title.as_deref(),
        )
        .await
        .map_err(|e| {
            warning!("Cover generation failed: {}", e);
            ApiError::new(StatusCode::BAD_GATEWAY, "Image generation failed").with_detail(e)
        })?;

    if let Some(audit) = state.audit.clone() {
        let http = state.http.clone();
        let body = json!({
            "creation_method": method.to_string(),
            "image_url": image_url,
            "tracks": request.tracks,
            "mood": request.mood,
            "playlist_title": request.playlist_title,
            "user_id_searched": request.user_id_searched,
        });
        tokio::spawn(record_generation(audit, http, body));
    }

    Ok(Json(ThumbnailResponse { image_url }))
}

async fn record_generation(audit: AuditLog, http: reqwest::Client, body: serde_json::Value) {
    let image_url = body["image_url"].as_str().unwrap_or_default();
    let image = match spotify::download_image(&http, image_url).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warning!("Audit log without image: {}", e);
            None
        }
    };

    if let Err(e) = audit.record("thumbnail", &body, image.as_deref()).await {
        warning!("Failed to write audit log: {}", e);
    }
}
