//! # Spotify Integration Module
//!
//! HTTP layer between the cover pipeline and the Spotify Web API.
//!
//! ## Architecture
//!
//! ```text
//! CLI / HTTP backend
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (PKCE user flow, client credentials)
//!     ├── Playlists (listing with offset pagination)
//!     ├── Tracks (listing following `next` links)
//!     └── Images (cover upload, source download)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Client Construction
//!
//! [`SpotifyClient`] owns a `reqwest::Client` and the API base URL. It is
//! built once by the caller and passed to whoever needs it; there is no
//! process-wide client. Tests point it at a local listener by handing in a
//! different base URL.
//!
//! ## API Coverage
//!
//! - `GET /users/{user_id}/playlists` - playlists of a user, 50 per page
//! - `GET /playlists/{playlist_id}/tracks` - tracks of a playlist, 100 per page
//! - `PUT /playlists/{playlist_id}/images` - custom cover upload (base64 JPEG)
//! - `POST /api/token` - PKCE exchange, refresh and client credentials grants
//!
//! ## Upload Transport
//!
//! [`SpotifyClient`] implements [`crate::cover::UploadTransport`]. The
//! response status is classified by [`crate::cover::UploadOutcome::from_status`],
//! network failures become [`crate::cover::UploadOutcome::TransportError`].

use reqwest::Client;

use crate::config;

pub mod auth;
pub mod images;
pub mod playlists;
pub mod tracks;

pub use images::download_image;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client pointed at the configured `SPOTIFY_API_URL`.
    pub fn from_env(http: Client) -> Self {
        Self::new(http, config::spotify_apiurl())
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
