// ==========================================
// 生产计数服务 - 健康检查
// ==========================================
// 通过连接池执行 SELECT 1; 失败返回 503
// ==========================================

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// (已创建连接数, 空闲连接数)
    pub pool: (usize, usize),
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Response {
    let (status_code, status) = match state.pool.ping().await {
        Ok(()) => (StatusCode::OK, HealthStatus::Healthy),
        Err(e) => {
            tracing::error!(error = %e, "健康检查失败");
            (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy)
        }
    };

    let body = HealthResponse {
        status,
        version: crate::VERSION.to_string(),
        pool: state.pool.status(),
    };
    (status_code, Json(body)).into_response()
}
