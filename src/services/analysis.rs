//! 压力/心率分析上游客户端
//!
//! 对分析后端的薄封装：一批帧加采样率换一次请求，期望拿到数值
//! `avg_heart_rate` 或 `error` 字段。任何传输失败、非成功状态或
//! 畸形响应都归一化为单个错误，不重试——一次失败即该次检测终止。

use std::time::Duration;

use serde_json::Value;

use crate::config::UpstreamConfig;

#[derive(Debug, Clone)]
pub struct StressAnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request timed out")]
    Timeout,
    #[error("analysis network error: {0}")]
    Network(String),
    #[error("analysis upstream returned status {status}")]
    Upstream { status: u16 },
    #[error("analysis rejected: {0}")]
    Rejected(String),
    #[error("analysis response malformed: {0}")]
    Malformed(String),
}

impl StressAnalysisClient {
    pub fn new(upstream: &UpstreamConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        // 0 表示不设客户端超时：上游对整批帧逐帧做人脸检测，
        // 耗时与帧数成正比，由部署方显式决定是否收紧
        if upstream.analysis_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(upstream.analysis_timeout_secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: upstream.analysis_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 发起唯一一次分析请求。成功时返回上游 JSON 原文（含
    /// avg_heart_rate 与附带的 HRV 指标），供 relay 透传。
    pub async fn analyze(&self, frames: &[String], fps: u32) -> Result<Value, AnalysisError> {
        let url = format!("{}/analyze-stress", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "frames": frames, "fps": fps }))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Malformed(e.to_string()))?;

        // 上游以 200 + error 字段表达业务失败（如有效帧不足）
        if let Some(message) = body.get("error").and_then(Value::as_str) {
            return Err(AnalysisError::Rejected(message.to_string()));
        }
        if !status.is_success() {
            return Err(AnalysisError::Upstream {
                status: status.as_u16(),
            });
        }

        match body.get("avg_heart_rate").and_then(Value::as_f64) {
            Some(bpm) if bpm.is_finite() => Ok(body),
            _ => Err(AnalysisError::Malformed(
                "missing numeric avg_heart_rate".to_string(),
            )),
        }
    }
}

fn classify_transport_error(e: reqwest::Error) -> AnalysisError {
    if e.is_timeout() {
        AnalysisError::Timeout
    } else {
        AnalysisError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(base: &str) -> UpstreamConfig {
        UpstreamConfig {
            analysis_base_url: base.to_string(),
            lecture_base_url: String::new(),
            transcript_base_url: String::new(),
            wikipedia_base_url: String::new(),
            request_timeout_secs: 5,
            analysis_timeout_secs: 0,
        }
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = StressAnalysisClient::new(&upstream("http://localhost:8000/"));
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_network_error() {
        // 关闭的端口，连接立即失败
        let client = StressAnalysisClient::new(&upstream("http://127.0.0.1:9"));
        let result = client
            .analyze(&["data:image/jpeg;base64,x".to_string()], 10)
            .await;
        assert!(matches!(result, Err(AnalysisError::Network(_))));
    }
}
