//! 聊天补全上游客户端
//!
//! mock 模式返回确定性文本（默认开启，供本地与测试使用）；
//! real 模式把组装好的 prompt POST 给配置的补全 API，期望
//! `{ "text": string }` 响应。

use serde_json::Value;

use crate::config::ChatConfig;

#[derive(Debug, Clone)]
pub struct ChatProvider {
    config: ChatConfig,
    client: reqwest::Client,
}

impl ChatProvider {
    pub fn new(config: &ChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    /// Validate chat configuration at startup.
    /// Panics when `enabled=true`, `mock=false` and no API URL is configured.
    pub fn validate_config(config: &ChatConfig) {
        if config.enabled && !config.mock && config.api_url.trim().is_empty() {
            panic!(
                "Invalid chat configuration: enabled=true and mock=false \
                 but CHAT_API_URL is empty. Set CHAT_API_URL or CHAT_MOCK=true."
            );
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }
        if self.config.mock {
            return Ok("Mock chat response".to_string());
        }

        let mut request = self
            .client
            .post(&self.config.api_url)
            .json(&serde_json::json!({ "prompt": prompt }));
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::Timeout
            } else {
                ChatError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::ApiError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChatError::Malformed(e.to_string()))?;
        body.get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.to_string())
            .ok_or_else(|| ChatError::Malformed("missing text field".to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat assistant is disabled")]
    Disabled,
    #[error("chat request timed out")]
    Timeout,
    #[error("chat network error: {0}")]
    Network(String),
    #[error("chat api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("chat response malformed: {0}")]
    Malformed(String),
}
