use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use tokio::sync::broadcast;

use studypulse_backend::config::{
    ChatConfig, Config, LimitsConfig, RateLimitConfig, UpstreamConfig,
};
use studypulse_backend::routes::build_router;
use studypulse_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

/// 直接构造 Config，避免 set_var 在多线程测试下的环境变量竞态。
/// 上游默认指向关闭的端口，需要真实上游的测试用 FakeUpstream 覆盖。
fn base_config() -> Config {
    Config {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: 100,
        },
        upstream: UpstreamConfig {
            analysis_base_url: "http://127.0.0.1:9".to_string(),
            lecture_base_url: "http://127.0.0.1:9".to_string(),
            transcript_base_url: "http://127.0.0.1:9".to_string(),
            wikipedia_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            analysis_timeout_secs: 2,
        },
        chat: ChatConfig {
            enabled: true,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 2,
        },
        limits: LimitsConfig { max_frames: 600 },
    }
}

pub async fn spawn_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let mut config = base_config();
    customize(&mut config);

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with(|_| {}).await
}
