use reqwest::Client;
use tabled::Table;

use crate::{error, info, management::AppTokenManager, spotify::SpotifyClient, utils};

pub async fn tracks(playlist_id: String) {
    let client = Client::new();
    let token = match AppTokenManager::new().get_valid_token(&client).await {
        Ok(token) => token,
        Err(e) => error!("Cannot authenticate against Spotify. Err: {}", e),
    };

    let spinner = super::spinner(format!("Fetching tracks of {}...", playlist_id));
    let result = SpotifyClient::from_env(client)
        .playlist_tracks(&token, &playlist_id)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(tracks) if tracks.is_empty() => info!("Playlist {} has no tracks", playlist_id),
        Ok(tracks) => {
            println!("{}", Table::new(utils::track_rows(&tracks)));
            info!("{} track(s)", tracks.len());
        }
        Err(e) => error!("Failed to fetch tracks. Err: {}", e),
    }
}
