mod common;

use std::{io::Cursor, sync::Arc};

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post, put},
};
use common::{gradient_image, spawn_mock};
use image::ImageFormat;
use reqwest::Client;
use serde_json::{Value, json};
use sporlcover::{
    api::AppState, cover::RetryPolicy, openai::OpenAiClient, server, spotify::SpotifyClient,
};

/// Starts the backend with Spotify and OpenAI pointed at `upstream`.
async fn spawn_backend(upstream: &str) -> String {
    let http = Client::new();
    let state = AppState::new(
        http.clone(),
        SpotifyClient::new(http.clone(), upstream),
        OpenAiClient::new(http.clone(), upstream, "test-key"),
        RetryPolicy::default(),
        None,
    );
    let state = Arc::new(state);
    spawn_mock(move |_| server::router(state)).await
}

fn png_cover() -> Vec<u8> {
    let mut png = Cursor::new(Vec::new());
    gradient_image(300, 300)
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();
    png.into_inner()
}

async fn post_json(url: String, body: Value) -> (StatusCode, Value) {
    let response = Client::new().post(url).json(&body).send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let backend = spawn_backend("http://127.0.0.1:9").await;

    let body: Value = reqwest::get(format!("{}/health", backend))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "sporlcover");
}

#[tokio::test]
async fn test_upload_with_missing_parameters() {
    let backend = spawn_backend("http://127.0.0.1:9").await;

    let (status, body) = post_json(
        format!("{}/upload-playlist-image", backend),
        json!({"playlist_id": "pl1", "image_url": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameters");
}

#[tokio::test]
async fn test_unknown_creation_method() {
    let backend = spawn_backend("http://127.0.0.1:9").await;

    let (status, body) = post_json(
        format!("{}/thumbnail/watercolor", backend),
        json!({"tracks": [{"title": "Habits", "artist": "Tove Lo"}], "mood": "calm"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Creation method not permitted");
}

#[tokio::test]
async fn test_thumbnail_without_tracks() {
    let backend = spawn_backend("http://127.0.0.1:9").await;

    let (status, _) = post_json(
        format!("{}/thumbnail/titles_artists", backend),
        json!({"tracks": [], "mood": "calm"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_thumbnail_from_titles_and_artists() {
    let upstream = spawn_mock(|_| {
        Router::new()
            .route(
                "/chat/completions",
                post(|| async {
                    Json(json!({"choices": [{"message": {"content": "a neon city at dusk"}}]}))
                }),
            )
            .route(
                "/images/generations",
                post(|Json(request): Json<Value>| async move {
                    assert!(
                        request["prompt"]
                            .as_str()
                            .unwrap()
                            .contains("a neon city at dusk")
                    );
                    Json(json!({"data": [{"url": "https://images.example/cover.png"}]}))
                }),
            )
    })
    .await;
    let backend = spawn_backend(&upstream).await;

    let (status, body) = post_json(
        format!("{}/thumbnail/titles_artists", backend),
        json!({
            "tracks": [{"title": "Habits", "artist": "Tove Lo"}],
            "mood": "melancholic",
            "playlist_title": "Late night",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_url"], "https://images.example/cover.png");
}

#[tokio::test]
async fn test_thumbnail_generation_failure() {
    let upstream = spawn_mock(|_| {
        Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        )
    })
    .await;
    let backend = spawn_backend(&upstream).await;

    let (status, body) = post_json(
        format!("{}/thumbnail/titles_artists", backend),
        json!({"tracks": [{"title": "Habits", "artist": "Tove Lo"}], "mood": "calm"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Image generation failed");
}

#[tokio::test]
async fn test_upload_playlist_image() {
    let upstream = spawn_mock(|_| {
        Router::new()
            .route("/cover.png", get(|| async { png_cover() }))
            .route(
                "/playlists/{playlist_id}/images",
                put(|| async { StatusCode::ACCEPTED }),
            )
    })
    .await;
    let backend = spawn_backend(&upstream).await;

    let (status, body) = post_json(
        format!("{}/upload-playlist-image", backend),
        json!({
            "playlist_id": "pl1",
            "image_url": format!("{}/cover.png", upstream),
            "access_token": "user-token",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image uploaded successfully!");
    assert_eq!(body["ceiling_kb"], 55);
    assert!(body["size_bytes"].as_u64().unwrap() <= 55 * 1024);
}

#[tokio::test]
async fn test_upload_exhausted_ladder_forwards_last_status() {
    let upstream = spawn_mock(|_| {
        Router::new()
            .route("/cover.png", get(|| async { png_cover() }))
            .route(
                "/playlists/{playlist_id}/images",
                put(|| async { StatusCode::PAYLOAD_TOO_LARGE }),
            )
    })
    .await;
    let backend = spawn_backend(&upstream).await;

    let (status, body) = post_json(
        format!("{}/upload-playlist-image", backend),
        json!({
            "playlist_id": "pl1",
            "image_url": format!("{}/cover.png", upstream),
            "access_token": "user-token",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Failed to upload image");
}

#[tokio::test]
async fn test_upload_with_broken_source_image() {
    let upstream = spawn_mock(|_| {
        Router::new().route("/cover.png", get(|| async { "<html>not found</html>" }))
    })
    .await;
    let backend = spawn_backend(&upstream).await;

    let (status, _) = post_json(
        format!("{}/upload-playlist-image", backend),
        json!({
            "playlist_id": "pl1",
            "image_url": format!("{}/cover.png", upstream),
            "access_token": "user-token",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
