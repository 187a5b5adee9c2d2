use std::time::Duration;

use reqwest::Client;
use tokio::time::Instant;

use crate::{
    config,
    cover::{BudgetedEncoder, JpegCodec, Ladder, RetryPolicy, TieredUploader},
    error, info,
    management::TokenManager,
    spotify::{self, SpotifyClient},
    success, utils,
};

pub enum ImageSource {
    Url(String),
    File(String),
}

#[derive(Debug, Clone, Default)]
pub struct UploadArgs {
    pub ladder: Option<Ladder>,
    pub timeout: Option<u64>,
    pub deadline: Option<u64>,
}

pub async fn upload(playlist_id: String, source: ImageSource, args: UploadArgs) {
    let mut token_mgr = match TokenManager::load().await {
        Ok(manager) => manager,
        Err(e) => error!(
            "Failed to load token. Please run sporlcover auth\n Error: {}",
            e
        ),
    };
    let token = match token_mgr.get_valid_token().await {
        Ok(token) => token,
        Err(e) => error!("Failed to refresh token. Please run sporlcover auth\n Error: {}", e),
    };

    let client = Client::new();
    let bytes = match source {
        ImageSource::Url(url) => match spotify::download_image(&client, &url).await {
            Ok(bytes) => bytes,
            Err(e) => error!("{}", e),
        },
        ImageSource::File(path) => match async_fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => error!("Cannot read {}. Err: {}", path, e),
        },
    };

    let ladder = match args.ladder {
        Some(ladder) => ladder,
        None => match config::upload_ladder() {
            Ok(ladder) => ladder,
            Err(e) => error!("{}", e),
        },
    };

    let mut policy = RetryPolicy::new(ladder).with_attempt_timeout(
        args.timeout
            .map(Duration::from_secs)
            .unwrap_or_else(config::upload_timeout),
    );
    if let Some(secs) = args.deadline {
        policy = policy.with_deadline(Instant::now() + Duration::from_secs(secs));
    }

    let uploader = TieredUploader::new(
        BudgetedEncoder::new(JpegCodec),
        SpotifyClient::from_env(client),
        policy,
    );

    let image = match uploader.decode(bytes).await {
        Ok(image) => image,
        Err(e) => error!("{}", e),
    };

    info!(
        "Uploading {}x{} cover to {} with ceilings {} KB",
        image.width(),
        image.height(),
        playlist_id,
        uploader.policy().ladder
    );

    let spinner = super::spinner("Uploading cover...".to_string());
    let result = uploader
        .upload_with_retry(&image, &token, &playlist_id)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => success!(
            "Cover uploaded: {} at quality {} under the {} KB ceiling after {} attempt(s)",
            utils::format_kb(report.size_bytes),
            report.quality.value(),
            report.ceiling_kb,
            report.attempts
        ),
        Err(e) => error!("Failed to upload image. Err: {}", e),
    }
}
