//! 百科摘要客户端
//!
//! 聊天助手的第二个上下文来源。REST page-summary 接口取 `extract`
//! 字段，截断到固定长度；失败时返回固定的降级句子，不向上抛错。

use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::constants::WIKI_SUMMARY_MAX_CHARS;
use crate::services::truncate_chars;

pub const WIKI_FALLBACK: &str = "No relevant Wikipedia information found.";

#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(client: reqwest::Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: upstream.wikipedia_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 按话题取摘要。任何失败都降级为固定句子并记录告警。
    pub async fn summary(&self, topic: &str) -> String {
        match self.try_summary(topic).await {
            Ok(Some(extract)) => extract,
            Ok(None) => WIKI_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, topic, "Wikipedia fetch failed, using fallback");
                WIKI_FALLBACK.to_string()
            }
        }
    }

    async fn try_summary(&self, topic: &str) -> Result<Option<String>, WikipediaFetchError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|_| WikipediaFetchError::BadBaseUrl)?;
        // path_segments_mut 负责对话题做百分号编码
        url.path_segments_mut()
            .map_err(|_| WikipediaFetchError::BadBaseUrl)?
            .extend(["page", "summary", topic]);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: Value = response.json().await?;
        Ok(body
            .get("extract")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| truncate_chars(s, WIKI_SUMMARY_MAX_CHARS).to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
enum WikipediaFetchError {
    #[error("wikipedia base url is not a valid base")]
    BadBaseUrl,
    #[error("wikipedia request error: {0}")]
    Request(#[from] reqwest::Error),
}
