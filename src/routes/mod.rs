pub mod chat;
pub mod health;
pub mod lectures;
pub mod stress;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::middleware::{rate_limit, request_id};
use crate::state::AppState;

/// 请求体上限：16 MiB。一次分析会带上整段捕获的几百帧 JPEG data URI。
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // 限流只挂在 API 子路由上，健康检查与静态页面不计数
    let api_routes = Router::new()
        .merge(stress::router())
        .merge(lectures::router())
        .merge(chat::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    // 前端单页应用：未命中的路径一律回 index.html
    let spa_fallback = ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback_service(spa_fallback)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
