use crate::{
    types::{GetPlaylistTracksResponse, PlaylistTrackItem, SimplifiedTrack},
    warning,
};

use super::SpotifyClient;

impl SpotifyClient {
    /// Retrieves every track of a playlist, following the `next` links.
    ///
    /// Items without a usable track (local files, removed tracks, episodes
    /// without an id) are skipped with a warning.
    pub async fn playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<SimplifiedTrack>, reqwest::Error> {
        let mut next = Some(format!(
            "{uri}/playlists/{id}/tracks?limit=100",
            uri = self.api_url(),
            id = playlist_id
        ));
        let mut tracks = Vec::new();

        while let Some(api_url) = next {
            let page = self
                .http()
                .get(&api_url)
                .bearer_auth(token)
                .send()
                .await?
                .error_for_status()?
                .json::<GetPlaylistTracksResponse>()
                .await?;

            for item in &page.items {
                match simplify_track(item) {
                    Some(track) => tracks.push(track),
                    None => warning!("A track was skipped"),
                }
            }
            next = page.next;
        }

        Ok(tracks)
    }
}

/// Reduce a playlist item to what the frontend renders, `None` when the
/// item carries no identifiable track.
pub fn simplify_track(item: &PlaylistTrackItem) -> Option<SimplifiedTrack> {
    let track = item.track.as_ref()?;
    let id = track.id.clone()?;

    let artist = track
        .artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let image_url = track
        .album
        .as_ref()
        .and_then(|album| album.images.first())
        .map(|image| image.url.clone())
        .unwrap_or_default();

    Some(SimplifiedTrack {
        id,
        name: track.name.clone(),
        artist,
        image_url,
    })
}
