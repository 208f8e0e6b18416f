//! YouTube 字幕客户端
//!
//! 聊天助手的上下文来源之一。失败不是错误：拿不到字幕时返回
//! 空字符串，prompt 构建方据此降级为仅用百科内容。

use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::constants::TRANSCRIPT_MAX_CHARS;
use crate::services::truncate_chars;

#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: reqwest::Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new(client: reqwest::Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: upstream.transcript_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 拉取并拼接字幕全文。任何失败都降级为空字符串并记录告警。
    pub async fn fetch(&self, video_id: &str) -> String {
        match self.try_fetch(video_id).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, video_id, "Transcript fetch failed, continuing without it");
                String::new()
            }
        }
    }

    async fn try_fetch(&self, video_id: &str) -> Result<String, reqwest::Error> {
        // video_id 已在路由层做过字符集校验，可安全拼进 query
        let url = format!("{}/videos?part=transcript&id={video_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(String::new());
        }
        let body: Value = response.json().await?;
        Ok(join_transcript(&body))
    }
}

/// 从响应体中取 `transcript[].text` 并以空格拼接，超长截断。
fn join_transcript(body: &Value) -> String {
    let Some(segments) = body.get("transcript").and_then(Value::as_array) else {
        return String::new();
    };
    let joined = segments
        .iter()
        .filter_map(|seg| seg.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    truncate_chars(&joined, TRANSCRIPT_MAX_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_segment_texts_in_order() {
        let body = serde_json::json!({
            "transcript": [
                { "text": "welcome to", "start": 0.0 },
                { "text": "the lecture", "start": 1.2 },
            ]
        });
        assert_eq!(join_transcript(&body), "welcome to the lecture");
    }

    #[test]
    fn missing_or_malformed_transcript_is_empty() {
        assert_eq!(join_transcript(&serde_json::json!({})), "");
        assert_eq!(join_transcript(&serde_json::json!({"transcript": "nope"})), "");
        assert_eq!(
            join_transcript(&serde_json::json!({"transcript": [{"start": 1}]})),
            ""
        );
    }
}
