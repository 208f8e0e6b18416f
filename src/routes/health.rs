use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/upstream", get(upstream_targets))
}

pub async fn health_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
        "chat": {
            "enabled": state.config().chat.enabled,
            "mock": state.config().chat.mock,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// 运维排障用：当前进程实际生效的上游地址（不含任何密钥）。
pub async fn upstream_targets(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let upstream = &state.config().upstream;
    Json(serde_json::json!({
        "analysis": upstream.analysis_base_url,
        "lecture": upstream.lecture_base_url,
        "transcript": upstream.transcript_base_url,
        "wikipedia": upstream.wikipedia_base_url,
        "analysisTimeoutSecs": upstream.analysis_timeout_secs,
    }))
}
