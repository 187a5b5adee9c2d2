use reqwest::Client;

use crate::{
    config,
    cover::{BudgetedEncoder, JpegCodec, RetryPolicy, TieredUploader},
    management::{AppTokenManager, AuditLog},
    openai::OpenAiClient,
    spotify::SpotifyClient,
};

/// Dependencies shared by the request handlers.
pub struct AppState {
    pub http: Client,
    pub spotify: SpotifyClient,
    pub openai: OpenAiClient,
    pub app_token: AppTokenManager,
    pub uploader: TieredUploader<JpegCodec, SpotifyClient>,
    pub audit: Option<AuditLog>,
}

impl AppState {
    pub fn new(
        http: Client,
        spotify: SpotifyClient,
        openai: OpenAiClient,
        policy: RetryPolicy,
        audit: Option<AuditLog>,
    ) -> Self {
        let uploader = TieredUploader::new(BudgetedEncoder::new(JpegCodec), spotify.clone(), policy);
        Self {
            http,
            spotify,
            openai,
            app_token: AppTokenManager::new(),
            uploader,
            audit,
        }
    }

    /// State assembled from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `OPENAI_API_KEY` is missing or `COVER_UPLOAD_LADDER` is invalid.
    pub fn from_env() -> Result<Self, String> {
        let http = Client::new();
        let policy =
            RetryPolicy::new(config::upload_ladder()?).with_attempt_timeout(config::upload_timeout());
        let audit = config::audit_log_enabled().then(AuditLog::in_data_dir);

        Ok(Self::new(
            http.clone(),
            SpotifyClient::from_env(http.clone()),
            OpenAiClient::from_env(http.clone())?,
            policy,
            audit,
        ))
    }
}
