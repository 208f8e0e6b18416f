//! 压力/心率分析 relay
//!
//! 浏览器把捕获到的帧批次整体交给本路由，本路由校验后原样转发给
//! 分析后端，并把上游 JSON（avg_heart_rate 及 HRV 指标）透传回去。
//! 上游的任何失败对前端都归一化为一条 500 错误，前端据此结束本次检测。

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{CAPTURE_FPS, MAX_CAPTURE_FPS};
use crate::extractors::JsonBody;
use crate::response::AppError;
use crate::state::AppState;
use crate::validation::validate_frames;

pub fn router() -> Router<AppState> {
    Router::new().route("/analyze-stress", post(analyze_stress))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeStressRequest {
    pub frames: Vec<String>,
    pub fps: Option<u32>,
}

async fn analyze_stress(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnalyzeStressRequest>,
) -> Result<Json<Value>, AppError> {
    validate_frames(&req.frames, state.config().limits.max_frames)
        .map_err(|e| AppError::bad_request("INVALID_FRAMES", &e))?;

    // fps 缺省取捕获端的标称采样率，异常值收紧到合法区间
    let fps = req.fps.unwrap_or(CAPTURE_FPS).clamp(1, MAX_CAPTURE_FPS);

    match state.analysis().analyze(&req.frames, fps).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            tracing::error!(
                error = %e,
                frames = req.frames.len(),
                fps,
                "Stress analysis failed"
            );
            Err(AppError::upstream_failure("Failed to analyze stress levels"))
        }
    }
}
