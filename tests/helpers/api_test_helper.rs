// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供临时数据库、完整路由与请求发送等功能
// ==========================================

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use production_count::{build_router, AppConfig, AppState};
use serde_json::Value;
use std::collections::HashMap;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// 测试配置: 指定数据库路径, 降低 bcrypt 成本
pub fn test_config(db_path: &str) -> AppConfig {
    let mut env = HashMap::new();
    env.insert("PRODUCTION_COUNT_DB_PATH".to_string(), db_path.to_string());
    env.insert("PRODUCTION_COUNT_JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string());
    env.insert("PRODUCTION_COUNT_BCRYPT_COST".to_string(), "4".to_string());
    env.insert("PRODUCTION_COUNT_POOL_SIZE".to_string(), "4".to_string());
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

/// 创建临时数据库并组装完整应用
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Router: 已绑定状态的路由
pub async fn create_test_app() -> (NamedTempFile, Router) {
    production_count::logging::init_test();

    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let config = test_config(&db_path);

    let state = AppState::new(&config).await.unwrap();
    (temp_file, build_router(state, &config))
}

/// 发送请求并解析 JSON 响应体（空响应体返回 Null）
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    authorization: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

/// 计数记录请求体
pub fn record(lot: &str, machine: i64, direction: &str, timestamp: &str) -> Value {
    serde_json::json!({
        "Lot_id": lot,
        "Machine_ID": machine,
        "Direction": direction,
        "Timestamp": timestamp,
        "Substrate": 0,
        "TTL": 5012,
        "badmark": 0,
        "ASSY_input": 19000,
        "NG": 12,
        "Good": 5000
    })
}
