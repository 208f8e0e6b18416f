use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::Config;
use crate::middleware::rate_limit::RateLimitState;
use crate::services::analysis::StressAnalysisClient;
use crate::services::chat_provider::ChatProvider;
use crate::services::transcript::TranscriptClient;
use crate::services::wikipedia::WikipediaClient;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    analysis: Arc<StressAnalysisClient>,
    transcript: Arc<TranscriptClient>,
    wikipedia: Arc<WikipediaClient>,
    chat: Arc<ChatProvider>,
    http: reqwest::Client,
    rate_limit: Arc<RateLimitState>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config, shutdown_tx: broadcast::Sender<()>) -> Self {
        // 普通上游（课程/字幕/百科）共用一个带超时的连接池；
        // 分析客户端单独建池，因为它的超时策略不同
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let analysis = Arc::new(StressAnalysisClient::new(&config.upstream));
        let transcript = Arc::new(TranscriptClient::new(http.clone(), &config.upstream));
        let wikipedia = Arc::new(WikipediaClient::new(http.clone(), &config.upstream));
        let chat = Arc::new(ChatProvider::new(&config.chat));
        let rate_limit = Arc::new(RateLimitState::new(
            config.rate_limit.window_secs,
            config.rate_limit.max_requests,
        ));

        Self {
            config: Arc::new(config.clone()),
            analysis,
            transcript,
            wikipedia,
            chat,
            http,
            rate_limit,
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analysis(&self) -> &StressAnalysisClient {
        &self.analysis
    }

    pub fn transcript(&self) -> &TranscriptClient {
        &self.transcript
    }

    pub fn wikipedia(&self) -> &WikipediaClient {
        &self.wikipedia
    }

    pub fn chat(&self) -> &ChatProvider {
        &self.chat
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn rate_limit(&self) -> &Arc<RateLimitState> {
        &self.rate_limit
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use crate::config::Config;

    use super::*;

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let cfg = Config::from_env();
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(&cfg, tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn uptime_starts_near_zero() {
        let cfg = Config::from_env();
        let (tx, _) = broadcast::channel(4);
        let state = AppState::new(&cfg, tx);
        assert!(state.uptime_secs() < 5);
    }
}
