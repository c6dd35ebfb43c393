// ==========================================
// 生产计数服务 - 账号路由
// ==========================================
// 响应体沿用既有客户端约定:
// - 邮箱不存在: 401 {error}
// - 密码错误: 401 {status:"error", message}
// - /authen 总是 200, 由 status 字段区分成功失败
// ==========================================

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::api::auth_api::{LoginOutcome, LoginRequest, RegisterRequest};
use crate::api::error::ApiResult;
use crate::app::AppState;
use crate::server::extract::ApiJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).get(list_users))
        .route("/login", post(login))
        .route("/authen", post(authen))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Response> {
    state.auth_api.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    )
        .into_response())
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Response> {
    let users = state.auth_api.list_users().await?;
    Ok(Json(users).into_response())
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    let response = match state.auth_api.login(req).await? {
        LoginOutcome::UnknownEmail => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        )
            .into_response(),
        LoginOutcome::WrongPassword => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "error", "message": "login failed" })),
        )
            .into_response(),
        LoginOutcome::Success { token } => Json(json!({
            "status": "ok",
            "message": "login success",
            "token": token,
        }))
        .into_response(),
    };
    Ok(response)
}

async fn authen(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.auth_api.authenticate(authorization) {
        Ok(decoded) => Json(json!({ "status": "ok", "decoded": decoded })).into_response(),
        Err(err) => {
            Json(json!({ "status": "error", "message": err.public_message() })).into_response()
        }
    }
}
