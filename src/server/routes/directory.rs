// ==========================================
// 生产计数服务 - 企业/机台路由
// ==========================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::app::AppState;
use crate::server::extract::ApiJson;

// ===== 请求体 =====

#[derive(Debug, Default, Deserialize)]
struct BusinessBody {
    #[serde(rename = "Business_name")]
    business_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StationBody {
    #[serde(rename = "Machine_name")]
    machine_name: Option<String>,
    #[serde(rename = "Business_id")]
    business_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct StationFilter {
    business_id: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/business", get(list_businesses).post(create_business))
        .route("/api/business/:id", put(rename_business).delete(delete_business))
        .route("/api/station", get(list_stations).post(create_station))
        .route("/api/station/:id", put(rename_station).delete(delete_station))
}

fn message(text: &str) -> Response {
    Json(json!({ "message": text })).into_response()
}

// ==========================================
// 企业
// ==========================================

async fn list_businesses(State(state): State<AppState>) -> ApiResult<Response> {
    let rows = state.directory_api.list_businesses().await?;
    Ok(Json(rows).into_response())
}

async fn create_business(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BusinessBody>,
) -> ApiResult<Response> {
    let created = state
        .directory_api
        .create_business(body.business_name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn rename_business(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<BusinessBody>,
) -> ApiResult<Response> {
    state
        .directory_api
        .rename_business(id, body.business_name.as_deref())
        .await?;
    Ok(message("Business updated successfully"))
}

async fn delete_business(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    state.directory_api.delete_business(id).await?;
    Ok(message("Business deleted successfully"))
}

// ==========================================
// 机台
// ==========================================

async fn list_stations(
    State(state): State<AppState>,
    Query(filter): Query<StationFilter>,
) -> ApiResult<Response> {
    let rows = state.directory_api.list_stations(filter.business_id).await?;
    Ok(Json(rows).into_response())
}

async fn create_station(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StationBody>,
) -> ApiResult<Response> {
    let machine_id = state
        .directory_api
        .create_station(body.machine_name.as_deref(), body.business_id)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "Machine_ID": machine_id }))).into_response())
}

async fn rename_station(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<StationBody>,
) -> ApiResult<Response> {
    state
        .directory_api
        .rename_station(id, body.machine_name.as_deref())
        .await?;
    Ok(message("Station updated successfully"))
}

async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    state.directory_api.delete_station(id).await?;
    Ok(message("Station deleted successfully"))
}
