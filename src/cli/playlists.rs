use reqwest::Client;
use tabled::Table;

use crate::{error, info, management::AppTokenManager, spotify::SpotifyClient, utils};

pub async fn playlists(user_id: String, search: Option<String>) {
    let client = Client::new();
    let token = match AppTokenManager::new().get_valid_token(&client).await {
        Ok(token) => token,
        Err(e) => error!("Cannot authenticate against Spotify. Err: {}", e),
    };

    let spinner = super::spinner(format!("Fetching playlists of {}...", user_id));
    let result = SpotifyClient::from_env(client)
        .playlists(&token, &user_id)
        .await;
    spinner.finish_and_clear();

    let mut playlists = match result {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to fetch playlists. Err: {}", e),
    };

    if let Some(search) = search {
        let search_term = search.to_lowercase();
        playlists.retain(|p| p.name.to_lowercase().contains(&search_term));
    }

    if playlists.is_empty() {
        info!("No playlists found for {}", user_id);
        return;
    }

    println!("{}", Table::new(utils::playlist_rows(&playlists)));
}
