//! 课程生成 relay
//!
//! GET /generate-lecture?topic=... 转发给课程生成后端。与分析 relay
//! 不同，这里透传上游状态码：上游 404（无此话题）必须原样回 404，
//! 前端依赖这一点区分"话题不存在"与"服务故障"。

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::response::AppError;
use crate::state::AppState;
use crate::validation::validate_topic;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-lecture", get(generate_lecture))
}

#[derive(Debug, Deserialize)]
pub struct LectureQuery {
    pub topic: Option<String>,
}

async fn generate_lecture(
    State(state): State<AppState>,
    Query(query): Query<LectureQuery>,
) -> Result<Json<Value>, AppError> {
    let topic = validate_topic(query.topic.as_deref().unwrap_or(""))
        .map_err(|e| AppError::bad_request("INVALID_TOPIC", e))?;

    let base = state
        .config()
        .upstream
        .lecture_base_url
        .trim_end_matches('/');
    let url = format!("{base}/generate-lecture");

    let response = state
        .http()
        .get(&url)
        .query(&[("topic", topic)])
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, topic, "Lecture upstream unreachable");
            AppError::upstream_failure("Failed to generate lecture")
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        tracing::error!(error = %e, topic, "Lecture upstream body read failed");
        AppError::upstream_failure("Failed to generate lecture")
    })?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Upstream error: {}", status.as_u16()));
        return Err(AppError::upstream_status(status.as_u16(), &message));
    }

    if body.is_object() {
        Ok(Json(body))
    } else {
        tracing::error!(topic, "Lecture upstream returned non-JSON success body");
        Err(AppError::upstream_failure("Failed to generate lecture"))
    }
}
