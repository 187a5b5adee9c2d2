use std::cmp::Ordering;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{PlaylistTableRow, SimplifiedPlaylist, SimplifiedTrack, TrackTableRow};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Human readable size, e.g. `48.7 KB`.
pub fn format_kb(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Playlist rows sorted by name, case-insensitive.
pub fn playlist_rows(playlists: &[SimplifiedPlaylist]) -> Vec<PlaylistTableRow> {
    let mut rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .map(|p| PlaylistTableRow {
            id: p.id.clone(),
            name: p.name.clone(),
            tracks: p.track_count,
        })
        .collect();

    rows.sort_by(|a, b| match a.name.to_lowercase().cmp(&b.name.to_lowercase()) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    rows
}

/// Track rows in playlist order.
pub fn track_rows(tracks: &[SimplifiedTrack]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            name: t.name.clone(),
            artist: t.artist.clone(),
        })
        .collect()
}
