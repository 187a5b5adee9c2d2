//! # API Module
//!
//! HTTP endpoints of the playlist cover backend.
//!
//! ## Endpoints
//!
//! - [`playlists`] - `GET /playlists/{user_id}`, simplified playlists of a user
//! - [`tracks`] - `GET /tracks/{playlist_id}`, simplified tracks of a playlist
//! - [`thumbnail`] - `POST /thumbnail/{creation_method}`, generates a cover and
//!   answers with its URL
//! - [`upload_playlist_image`] - `POST /upload-playlist-image`, downloads a
//!   generated cover, fits it into the size ladder and pushes it to Spotify
//! - [`health`] - `GET /health`, status and version
//! - [`callback`] - `GET /callback`, OAuth PKCE callback, only mounted by the
//!   short-lived server that `sporlcover auth` starts
//!
//! ## State
//!
//! Handlers share one [`AppState`] behind an `Arc`, injected as an axum
//! `Extension`. Listing endpoints use an application token (client
//! credentials); the upload endpoint uses the user token sent in the body.
//!
//! ## Errors
//!
//! Failures are answered with [`ApiError`], a `{"error", "detail"}` JSON
//! body. Upload failures carry the status of the underlying
//! [`crate::cover::CoverError`], so an exhausted ladder answers with the
//! last rejection status from Spotify.

mod callback;
mod error;
mod health;
mod playlists;
mod state;
mod thumbnail;
mod tracks;
mod upload;

pub use callback::callback;
pub use error::ApiError;
pub use health::health;
pub use playlists::playlists;
pub use state::AppState;
pub use thumbnail::thumbnail;
pub use tracks::tracks;
pub use upload::upload_playlist_image;
