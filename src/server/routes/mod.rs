// ==========================================
// 生产计数服务 - HTTP 路由
// ==========================================

pub mod auth;
pub mod count_records;
pub mod directory;
pub mod health;

use axum::Router;

use crate::app::AppState;

/// 汇总全部路由（未绑定 State）
pub fn all() -> Router<AppState> {
    Router::new()
        .merge(count_records::router())
        .merge(directory::router())
        .merge(auth::router())
        .merge(health::router())
}
