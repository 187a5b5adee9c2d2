use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::{
    cover::CoverError,
    spotify, success,
    types::UploadImageRequest,
    warning,
};

use super::{ApiError, AppState};

pub async fn upload_playlist_image(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<UploadImageRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(playlist_id), Some(image_url), Some(access_token)) = (
        request.playlist_id.filter(|v| !v.is_empty()),
        request.image_url.filter(|v| !v.is_empty()),
        request.access_token.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing parameters"));
    };

    let result: Result<_, CoverError> = async {
        let bytes = spotify::download_image(&state.http, &image_url).await?;
        let source = state.uploader.decode(bytes).await?;
        state
            .uploader
            .upload_with_retry(&source, &access_token, &playlist_id)
            .await
    }
    .await;

    match result {
        Ok(report) => {
            success!(
                "Cover of {} uploaded at {} KB ceiling (quality {}, {} attempt(s))",
                playlist_id,
                report.ceiling_kb,
                report.quality.value(),
                report.attempts
            );
            Ok(Json(json!({
                "message": "Image uploaded successfully!",
                "ceiling_kb": report.ceiling_kb,
                "size_bytes": report.size_bytes,
            })))
        }
        Err(e) => {
            warning!("Cover upload for {} failed: {}", playlist_id, e);
            Err(ApiError::upload_failed(&e))
        }
    }
}
