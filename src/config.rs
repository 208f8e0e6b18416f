use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use std::fmt;

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub upstream: UpstreamConfig,
    pub chat: ChatConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

/// 上游服务地址与超时配置
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// 心率/压力分析后端
    pub analysis_base_url: String,
    /// 课程生成后端
    pub lecture_base_url: String,
    /// YouTube 字幕代理
    pub transcript_base_url: String,
    /// 百科摘要 REST API
    pub wikipedia_base_url: String,
    /// 普通上游请求超时（秒）
    pub request_timeout_secs: u64,
    /// 分析请求超时（秒），0 表示不设客户端超时
    pub analysis_timeout_secs: u64,
}

#[derive(Clone)]
pub struct ChatConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// 单次分析请求允许的最大帧数
    pub max_frames: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("cors_origin", &self.cors_origin)
            .field("trust_proxy", &self.trust_proxy)
            .field("rate_limit", &self.rate_limit)
            .field("upstream", &self.upstream)
            .field("chat", &self.chat)
            .field("limits", &self.limits)
            .finish()
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:3000"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            upstream: UpstreamConfig {
                analysis_base_url: env_or("ANALYSIS_BASE_URL", "http://localhost:8000"),
                lecture_base_url: env_or("LECTURE_BASE_URL", "http://localhost:8000"),
                transcript_base_url: env_or("TRANSCRIPT_BASE_URL", "https://yt.lemnoslife.com"),
                wikipedia_base_url: env_or(
                    "WIKIPEDIA_BASE_URL",
                    "https://en.wikipedia.org/api/rest_v1",
                ),
                request_timeout_secs: env_or_parse("UPSTREAM_TIMEOUT_SECS", 15_u64),
                // 分析请求历史上不设客户端超时（上游要处理整批帧），
                // 0 保持该行为，部署方可显式收紧
                analysis_timeout_secs: env_or_parse("ANALYSIS_TIMEOUT_SECS", 0_u64),
            },
            chat: ChatConfig {
                enabled: env_or_bool("CHAT_ENABLED", true),
                mock: env_or_bool("CHAT_MOCK", true),
                api_url: env_or("CHAT_API_URL", ""),
                api_key: env_or("CHAT_API_KEY", ""),
                timeout_secs: env_or_parse("CHAT_TIMEOUT_SECS", 30_u64),
            },
            limits: LimitsConfig {
                max_frames: env_or_parse("MAX_ANALYSIS_FRAMES", 600_usize),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
