use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, header::CONTENT_TYPE};

use crate::cover::{CoverError, UploadOutcome, UploadTransport};

use super::SpotifyClient;

impl UploadTransport for SpotifyClient {
    /// Replaces the cover of `target_id` with the given JPEG.
    ///
    /// The endpoint expects the JPEG base64-encoded in the request body while
    /// still declaring `image/jpeg` as the content type.
    async fn upload(&self, target_id: &str, auth_token: &str, jpeg: &[u8]) -> UploadOutcome {
        let api_url = format!(
            "{uri}/playlists/{id}/images",
            uri = self.api_url(),
            id = target_id
        );

        let response = self
            .http()
            .put(&api_url)
            .bearer_auth(auth_token)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(STANDARD.encode(jpeg))
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                UploadOutcome::from_status(status, body)
            }
            Err(err) => UploadOutcome::TransportError(err.to_string()),
        }
    }
}

/// Fetches the bytes behind `url`.
///
/// # Errors
///
/// Returns [`CoverError::Download`] on network failure or a non-success status.
pub async fn download_image(http: &Client, url: &str) -> Result<Vec<u8>, CoverError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| CoverError::Download(e.to_string()))?;

    if !response.status().is_success() {
        return Err(CoverError::Download(format!(
            "Failed to download image. Status code: {}",
            response.status().as_u16()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CoverError::Download(e.to_string()))?;
    Ok(bytes.to_vec())
}
