//! # OpenAI Module
//!
//! Produces playlist cover images from the selected tracks.
//!
//! Generation is two-step: a chat model first writes a description of an
//! image fusing either the track artwork ([`CreationMethod::TrackThumbnails`])
//! or the track titles and artists ([`CreationMethod::TitlesArtists`]), then
//! the image model renders that description. The result is a URL to the
//! generated image, which the upload path downloads and fits into the cover
//! size budget.

use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{config, types::ThumbnailTrack};

pub mod prompt;

pub use prompt::CreationMethod;

#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("OpenAI request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OpenAI API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected OpenAI response: {0}")]
    Response(String),
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_url: String,
    api_key: String,
    pub chat_model: String,
    pub vision_model: String,
    pub image_model: String,
    pub image_size: String,
}

impl OpenAiClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chat_model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4o-mini".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
        }
    }

    /// Client configured from `OPENAI_API_URL` and `OPENAI_API_KEY`.
    pub fn from_env(http: Client) -> Result<Self, String> {
        Ok(Self::new(http, config::openai_apiurl(), config::openai_api_key()?))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, OpenAiError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn completion(&self, body: Value) -> Result<String, OpenAiError> {
        let json = self.post("/chat/completions", &body).await?;
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| OpenAiError::Response("completion without content".to_string()))
    }

    /// Sends one user message and returns the reply.
    pub async fn chat(&self, message: &str) -> Result<String, OpenAiError> {
        self.completion(json!({
            "model": self.chat_model,
            "messages": [{"role": "user", "content": message}],
        }))
        .await
    }

    /// Describes an image fusing all `urls`, looked at in low detail.
    pub async fn describe_images(
        &self,
        urls: &[String],
        mood: &str,
        playlist_title: Option<&str>,
    ) -> Result<String, OpenAiError> {
        let mut content = vec![json!({
            "type": "text",
            "text": prompt::describe_images_prompt(mood, playlist_title),
        })];
        content.extend(urls.iter().map(|url| {
            json!({
                "type": "image_url",
                "image_url": {"url": url, "detail": "low"},
            })
        }));

        self.completion(json!({
            "model": self.vision_model,
            "messages": [{"role": "user", "content": content}],
            "max_tokens": 512,
        }))
        .await
    }

    /// Describes an image fusing the titles and artists of `tracks`.
    pub async fn describe_titles_artists(
        &self,
        tracks: &[ThumbnailTrack],
        mood: &str,
        playlist_title: Option<&str>,
    ) -> Result<String, OpenAiError> {
        self.chat(&prompt::describe_tracks_prompt(tracks, mood, playlist_title))
            .await
    }

    /// Renders `prompt` and returns the URL of the generated image.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, OpenAiError> {
        let json = self
            .post(
                "/images/generations",
                &json!({
                    "model": self.image_model,
                    "prompt": prompt,
                    "n": 1,
                    "size": self.image_size,
                    "quality": "standard",
                }),
            )
            .await?;

        json["data"][0]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| OpenAiError::Response("no image in response".to_string()))
    }

    pub async fn fusion_images(
        &self,
        urls: &[String],
        mood: &str,
        playlist_title: Option<&str>,
    ) -> Result<String, OpenAiError> {
        let description = self.describe_images(urls, mood, playlist_title).await?;
        self.generate_image(&prompt::thumbnail_prompt(
            CreationMethod::TrackThumbnails,
            &description,
        ))
        .await
    }

    pub async fn fusion_titles_artists(
        &self,
        tracks: &[ThumbnailTrack],
        mood: &str,
        playlist_title: Option<&str>,
    ) -> Result<String, OpenAiError> {
        let description = self
            .describe_titles_artists(tracks, mood, playlist_title)
            .await?;
        self.generate_image(&prompt::thumbnail_prompt(
            CreationMethod::TitlesArtists,
            &description,
        ))
        .await
    }

    /// Generates a cover for `tracks` with the given method.
    pub async fn generate(
        &self,
        method: CreationMethod,
        tracks: &[ThumbnailTrack],
        mood: &str,
        playlist_title: Option<&str>,
    ) -> Result<String, OpenAiError> {
        match method {
            CreationMethod::TrackThumbnails => {
                let urls: Vec<String> = tracks
                    .iter()
                    .map(|track| track.image_url.clone())
                    .filter(|url| !url.is_empty())
                    .collect();
                self.fusion_images(&urls, mood, playlist_title).await
            }
            CreationMethod::TitlesArtists => {
                self.fusion_titles_artists(tracks, mood, playlist_title)
                    .await
            }
        }
    }
}
