//! 课程问答助手
//!
//! 收到学生提问后并发拉取两路上下文（视频字幕、百科摘要），拼装
//! prompt 交给聊天补全上游。两路上下文都是尽力而为：任何一路失败
//! 都降级继续，只有补全本身失败才向前端报错。

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::extractors::JsonBody;
use crate::response::AppError;
use crate::services::chat_provider::ChatError;
use crate::services::wikipedia::WIKI_FALLBACK;
use crate::state::AppState;
use crate::validation::{validate_message, validate_topic, validate_video_id};

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub video_id: Option<String>,
    pub topic: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let message = validate_message(&req.message)
        .map_err(|e| AppError::bad_request("INVALID_MESSAGE", e))?;

    let topic = match req.topic.as_deref() {
        Some(t) if !t.trim().is_empty() => {
            Some(validate_topic(t).map_err(|e| AppError::bad_request("INVALID_TOPIC", e))?)
        }
        _ => None,
    };
    let video_id = match req.video_id.as_deref() {
        Some(v) if !v.is_empty() => {
            Some(validate_video_id(v).map_err(|e| AppError::bad_request("INVALID_VIDEO_ID", e))?)
        }
        _ => None,
    };

    // 两路上下文并发取，互不阻塞；缺哪一路就降级哪一路
    let transcript_fut = async {
        match video_id {
            Some(id) => state.transcript().fetch(id).await,
            None => String::new(),
        }
    };
    let wiki_fut = async {
        match topic {
            Some(t) => state.wikipedia().summary(t).await,
            None => WIKI_FALLBACK.to_string(),
        }
    };
    let (transcript, wiki) = futures::join!(transcript_fut, wiki_fut);

    let prompt = build_prompt(
        message,
        topic.unwrap_or("the current lecture"),
        &transcript,
        &wiki,
    );

    match state.chat().generate(&prompt).await {
        Ok(text) => Ok(Json(serde_json::json!({ "text": text }))),
        Err(ChatError::Disabled) => {
            tracing::warn!("Chat request received while assistant is disabled");
            Err(AppError::upstream_failure("Failed to get chat response"))
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat completion failed");
            Err(AppError::upstream_failure("Failed to get chat response"))
        }
    }
}

/// 拼装补全 prompt。字幕段仅在拿到字幕时出现；百科段始终存在
/// （失败时是固定的降级句子，让模型知道背景资料缺失）。
fn build_prompt(message: &str, topic: &str, transcript: &str, wiki: &str) -> String {
    let mut prompt = format!(
        "You are a helpful study assistant for a lecture on \"{topic}\".\n\n\
         Use the context below to answer the student's question. Format the \
         answer in Markdown. If the sources disagree, mention the conflicting \
         perspectives instead of silently picking one.\n\n"
    );
    if !transcript.trim().is_empty() {
        prompt.push_str("Lecture transcript:\n");
        prompt.push_str(transcript);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Background information:\n");
    prompt.push_str(wiki);
    prompt.push_str("\n\nStudent question: ");
    prompt.push_str(message);
    prompt
}
