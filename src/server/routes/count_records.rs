// ==========================================
// 生产计数服务 - 计数记录路由
// ==========================================
// 两套表共用同一组处理函数, RecordVariant 通过 Extension 注入
// 按批次查询无结果返回 200 {}; 按机台查询无结果返回 404
// ==========================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;

use crate::api::error::ApiResult;
use crate::app::AppState;
use crate::server::extract::ApiJson;
use crate::domain::count_record::NewCountRecord;
use crate::domain::types::{RecordVariant, ResolutionPolicy, SnapshotProjection};

/// 挂载两套表的全部计数记录路由
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/countrecords", variant_router(RecordVariant::Plain))
        .nest(
            "/api/countrecords_counttray",
            variant_router(RecordVariant::CountTray),
        )
        .route("/api/Lot_idData/countrecords", get(lots_by_recency_plain))
        .route(
            "/api/Lot_idData/countrecords_counttray",
            get(lots_by_recency_counttray),
        )
        .route(
            "/api/business/countrecords_counttray/:business_id",
            get(list_by_business),
        )
}

fn variant_router(variant: RecordVariant) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(list_all).post(insert_batch))
        .route("/latest/:lot_id", get(latest_by_lot))
        .route("/CorrectLatest/:lot_id", get(latest_correct_by_lot))
        .route("/Position/:machine_id/:direction", get(position))
        .route("/Position/:machine_id/:direction/:lot_id", get(position_for_lot))
        .route("/PositionCBM/:machine_id/:direction", get(position_detail))
        .route(
            "/PositionCBM/:machine_id/:direction/:lot_id",
            get(position_detail_for_lot),
        )
        .route("/:key", get(list_by_lot).delete(delete_by_lot));

    if variant.has_business_id() {
        router = router
            .route("/Lot_id", get(distinct_lots))
            .route("/Lot_id/", get(distinct_lots))
            .route("/datetime_range/:start/:end", get(time_range))
            .route("/:key/datetime_range/:start/:end", get(time_range_for_business));
    }

    router.layer(Extension(variant))
}

// ==========================================
// 按批次
// ==========================================

async fn resolve_lot(
    state: &AppState,
    variant: RecordVariant,
    lot_id: &str,
    policy: ResolutionPolicy,
) -> ApiResult<Response> {
    let found = state
        .count_record_api
        .latest_by_lot(variant, lot_id, policy)
        .await?;
    Ok(match found {
        Some(view) => Json(view).into_response(),
        None => Json(json!({})).into_response(),
    })
}

async fn latest_by_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path(lot_id): Path<String>,
) -> ApiResult<Response> {
    resolve_lot(&state, variant, &lot_id, ResolutionPolicy::Latest).await
}

async fn latest_correct_by_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path(lot_id): Path<String>,
) -> ApiResult<Response> {
    resolve_lot(&state, variant, &lot_id, ResolutionPolicy::LatestCorrect).await
}

// ==========================================
// 按机台
// ==========================================

async fn station_reading(
    state: &AppState,
    variant: RecordVariant,
    machine_id: &str,
    direction: &str,
    lot_id: Option<&str>,
    projection: SnapshotProjection,
) -> ApiResult<Response> {
    let reading = state
        .count_record_api
        .latest_by_station(variant, machine_id, direction, lot_id, projection)
        .await?;
    Ok(Json(reading).into_response())
}

async fn position(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((machine_id, direction)): Path<(String, String)>,
) -> ApiResult<Response> {
    station_reading(
        &state,
        variant,
        &machine_id,
        &direction,
        None,
        SnapshotProjection::Position,
    )
    .await
}

async fn position_for_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((machine_id, direction, lot_id)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    station_reading(
        &state,
        variant,
        &machine_id,
        &direction,
        Some(&lot_id),
        SnapshotProjection::Position,
    )
    .await
}

async fn position_detail(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((machine_id, direction)): Path<(String, String)>,
) -> ApiResult<Response> {
    station_reading(
        &state,
        variant,
        &machine_id,
        &direction,
        None,
        SnapshotProjection::Detail,
    )
    .await
}

async fn position_detail_for_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((machine_id, direction, lot_id)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    station_reading(
        &state,
        variant,
        &machine_id,
        &direction,
        Some(&lot_id),
        SnapshotProjection::Detail,
    )
    .await
}

// ==========================================
// 批次号列表
// ==========================================

async fn distinct_lots(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
) -> ApiResult<Response> {
    let lots = state.count_record_api.list_distinct_lots(variant).await?;
    Ok(Json(lots).into_response())
}

async fn lots_by_recency(state: &AppState, variant: RecordVariant) -> ApiResult<Response> {
    let lots = state.count_record_api.list_lots_by_recency(variant).await?;
    Ok(Json(lots).into_response())
}

async fn lots_by_recency_plain(State(state): State<AppState>) -> ApiResult<Response> {
    lots_by_recency(&state, RecordVariant::Plain).await
}

async fn lots_by_recency_counttray(State(state): State<AppState>) -> ApiResult<Response> {
    lots_by_recency(&state, RecordVariant::CountTray).await
}

// ==========================================
// 列表
// ==========================================

async fn list_all(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
) -> ApiResult<Response> {
    let rows = state.count_record_api.list_all(variant).await?;
    Ok(Json(rows).into_response())
}

async fn list_by_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path(lot_id): Path<String>,
) -> ApiResult<Response> {
    let rows = state.count_record_api.list_by_lot(variant, &lot_id).await?;
    Ok(Json(rows).into_response())
}

async fn list_by_business(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
) -> ApiResult<Response> {
    let rows = state.count_record_api.list_by_business(&business_id).await?;
    Ok(Json(rows).into_response())
}

async fn time_range(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((start, end)): Path<(String, String)>,
) -> ApiResult<Response> {
    let rows = state
        .count_record_api
        .list_by_time_range(variant, &start, &end, None)
        .await?;
    Ok(Json(rows).into_response())
}

async fn time_range_for_business(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path((business_id, start, end)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let rows = state
        .count_record_api
        .list_by_time_range(variant, &start, &end, Some(&business_id))
        .await?;
    Ok(Json(rows).into_response())
}

// ==========================================
// 写入 / 删除
// ==========================================

async fn insert_batch(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    ApiJson(records): ApiJson<Vec<NewCountRecord>>,
) -> ApiResult<Response> {
    let inserted = state.count_record_api.insert_batch(variant, records).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Data inserted successfully", "inserted": inserted })),
    )
        .into_response())
}

async fn delete_by_lot(
    State(state): State<AppState>,
    Extension(variant): Extension<RecordVariant>,
    Path(lot_id): Path<String>,
) -> ApiResult<Response> {
    let rowcount = state.count_record_api.delete_by_lot(variant, &lot_id).await?;
    Ok(Json(json!({ "rowcount": rowcount })).into_response())
}
