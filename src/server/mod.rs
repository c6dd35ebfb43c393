// ==========================================
// 生产计数服务 - HTTP 服务层
// ==========================================
// 职责: 组装路由与中间件（CORS / 请求超时 / 请求日志）
// ==========================================

pub mod error;
pub mod extract;
pub mod routes;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::config::AppConfig;

/// 构建完整的 HTTP 应用
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    routes::all()
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS: 未配置来源时允许任意来源
fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: 允许任意来源");
        return cors.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "CORS 来源格式无效, 已忽略");
                None
            }
        })
        .collect();
    tracing::info!(?origins, "CORS: 仅允许配置的来源");

    cors.allow_origin(origins)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
