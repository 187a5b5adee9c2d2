use crate::types::{GetUserPlaylistsResponse, Playlist, SimplifiedPlaylist};

use super::SpotifyClient;

const PAGE_LIMIT: usize = 50;

impl SpotifyClient {
    /// Retrieves every playlist of `user_id`.
    ///
    /// Pages through `/users/{user_id}/playlists` 50 items at a time and stops
    /// at the first page holding fewer than 50 items.
    ///
    /// # Errors
    ///
    /// Network failures and non-success statuses are propagated as
    /// `reqwest::Error`.
    pub async fn playlists(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<SimplifiedPlaylist>, reqwest::Error> {
        let mut playlists: Vec<Playlist> = Vec::new();
        let mut offset = 0;

        loop {
            let api_url = format!(
                "{uri}/users/{user_id}/playlists?limit={limit}&offset={offset}",
                uri = self.api_url(),
                user_id = user_id,
                limit = PAGE_LIMIT,
                offset = offset
            );

            let page = self
                .http()
                .get(&api_url)
                .bearer_auth(token)
                .send()
                .await?
                .error_for_status()?
                .json::<GetUserPlaylistsResponse>()
                .await?;

            let page_len = page.items.len();
            playlists.extend(page.items);
            if page_len < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }

        Ok(playlists.iter().map(simplify_playlist).collect())
    }
}

/// Reduce a playlist object to what the frontend renders.
pub fn simplify_playlist(playlist: &Playlist) -> SimplifiedPlaylist {
    SimplifiedPlaylist {
        id: playlist.id.clone(),
        image_url: playlist
            .images
            .as_ref()
            .and_then(|images| images.first())
            .map(|image| image.url.clone())
            .unwrap_or_default(),
        name: playlist.name.clone(),
        track_count: playlist.tracks.total,
    }
}
