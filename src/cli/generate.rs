use reqwest::Client;

use crate::{
    error, info,
    management::AppTokenManager,
    openai::{CreationMethod, OpenAiClient},
    spotify::SpotifyClient,
    success,
    types::ThumbnailTrack,
};

use super::UploadArgs;

pub struct GenerateArgs {
    pub playlist_id: String,
    pub method: CreationMethod,
    pub mood: Option<String>,
    pub title: Option<String>,
    pub limit: usize,
    pub upload: Option<UploadArgs>,
}

pub async fn generate(args: GenerateArgs) {
    let client = Client::new();
    let openai = match OpenAiClient::from_env(client.clone()) {
        Ok(openai) => openai,
        Err(e) => error!("{}", e),
    };

    let token = match AppTokenManager::new().get_valid_token(&client).await {
        Ok(token) => token,
        Err(e) => error!("Cannot authenticate against Spotify. Err: {}", e),
    };

    let tracks: Vec<ThumbnailTrack> = match SpotifyClient::from_env(client.clone())
        .playlist_tracks(&token, &args.playlist_id)
        .await
    {
        Ok(tracks) => tracks
            .into_iter()
            .take(args.limit)
            .map(|t| ThumbnailTrack {
                image_url: t.image_url,
                artist: t.artist,
                title: t.name,
            })
            .collect(),
        Err(e) => error!("Failed to fetch tracks. Err: {}", e),
    };

    if tracks.is_empty() {
        error!("Playlist {} has no tracks to build a cover from", args.playlist_id);
    }

    info!(
        "Generating cover from {} track(s) using {}",
        tracks.len(),
        args.method
    );
    let spinner = super::spinner("Waiting for the image model...".to_string());
    let result = openai
        .generate(
            args.method,
            &tracks,
            args.mood.as_deref().unwrap_or_default(),
            args.title.as_deref(),
        )
        .await;
    spinner.finish_and_clear();

    let image_url = match result {
        Ok(url) => url,
        Err(e) => error!("Cover generation failed. Err: {}", e),
    };
    success!("Cover generated: {}", image_url);

    if let Some(upload) = args.upload {
        super::upload(args.playlist_id, super::ImageSource::Url(image_url), upload).await;
    }
}
