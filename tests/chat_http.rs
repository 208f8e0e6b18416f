//! 问答助手：mock 补全、上下文降级与入参校验。

mod common;

use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use common::app::{spawn_test_app, spawn_test_app_with};
use common::http::{assert_json_error, request, response_json};
use common::upstream::FakeUpstream;

#[tokio::test]
async fn it_answers_with_mock_completion() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({ "message": "What is a tensor?", "topic": "linear algebra" })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Mock chat response");
}

#[tokio::test]
async fn it_degrades_when_context_upstreams_are_down() {
    // 字幕与百科上游都指向关闭的端口，仍应 200
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "message": "Summarize the lecture",
            "videoId": "dQw4w9WgXcQ",
            "topic": "gravity",
        })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Mock chat response");
}

#[tokio::test]
async fn it_fetches_transcript_and_wiki_context() {
    let transcript = FakeUpstream::spawn(Router::new().route(
        "/videos",
        get(|| async {
            Json(json!({
                "transcript": [
                    { "text": "mass bends spacetime", "start": 0.0 },
                ]
            }))
        }),
    ))
    .await;
    let wiki = FakeUpstream::spawn(Router::new().route(
        "/page/summary/:topic",
        get(|| async { Json(json!({ "extract": "Gravity is a natural phenomenon." })) }),
    ))
    .await;

    let app = spawn_test_app_with(|c| {
        c.upstream.transcript_base_url = transcript.base_url.clone();
        c.upstream.wikipedia_base_url = wiki.base_url.clone();
    })
    .await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "message": "Why do planets orbit?",
            "videoId": "abc123",
            "topic": "gravity",
        })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Mock chat response");
}

#[tokio::test]
async fn it_rejects_empty_message() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({ "message": "  " })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_MESSAGE");
}

#[tokio::test]
async fn it_rejects_bad_video_id() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({ "message": "hello", "videoId": "../../etc" })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_VIDEO_ID");
}

#[tokio::test]
async fn it_rejects_missing_body() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::POST, "/api/chat", None, &[]).await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
}

#[tokio::test]
async fn it_reports_disabled_chat_as_error() {
    let app = spawn_test_app_with(|c| c.chat.enabled = false).await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/chat",
        Some(json!({ "message": "hello" })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to get chat response");
}
