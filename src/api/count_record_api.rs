// ==========================================
// 生产计数服务 - 计数记录 API
// ==========================================
// 职责: 路径参数校验 + 调用 CountRecordStore
// 约束: 校验在查询之前完成, 校验失败不触达数据库
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::count_record::{
    CountRecord, CountRecordView, LotRef, NewCountRecord, StationReading,
};
use crate::domain::timestamp;
use crate::domain::types::{RecordVariant, ResolutionPolicy, SnapshotProjection};
use crate::repository::count_record_store::{CountRecordStore, StationQuery};

// ==========================================
// 参数解析
// ==========================================

fn require_text<'a>(value: &'a str, field: &str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn parse_id(value: &str, field: &str) -> ApiResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidInput(format!("Invalid {}: {}", field, value)))
}

fn parse_time(value: &str, field: &str) -> ApiResult<NaiveDateTime> {
    timestamp::parse(value)
        .ok_or_else(|| ApiError::InvalidInput(format!("Invalid {}: {}", field, value)))
}

// ==========================================
// CountRecordApi
// ==========================================

/// 计数记录 API（两套表共用, 由 RecordVariant 区分）
pub struct CountRecordApi {
    store: Arc<dyn CountRecordStore>,
}

impl CountRecordApi {
    pub fn new(store: Arc<dyn CountRecordStore>) -> Self {
        Self { store }
    }

    // ===== 批次解析 =====

    /// 批次当前记录; 无记录时返回 None（由路由层输出 `{}`）
    pub async fn latest_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
        policy: ResolutionPolicy,
    ) -> ApiResult<Option<CountRecordView>> {
        let lot_id = require_text(lot_id, "Lot_id")?;
        Ok(self.store.latest_by_lot(variant, lot_id, policy).await?)
    }

    /// 机台最新快照; 无记录时返回 NoData（404）
    pub async fn latest_by_station(
        &self,
        variant: RecordVariant,
        machine_id: &str,
        direction: &str,
        lot_id: Option<&str>,
        projection: SnapshotProjection,
    ) -> ApiResult<StationReading> {
        let query = StationQuery {
            machine_id: parse_id(machine_id, "Machine_ID")?,
            direction: require_text(direction, "Direction")?.to_string(),
            lot_id: match lot_id {
                Some(lot) => Some(require_text(lot, "Lot_id")?.to_string()),
                None => None,
            },
        };
        debug!(?query, %variant, "机台快照查询");

        self.store
            .latest_by_station(variant, query, projection)
            .await?
            .ok_or(ApiError::NoData)
    }

    pub async fn list_distinct_lots(&self, variant: RecordVariant) -> ApiResult<Vec<LotRef>> {
        Ok(self.store.list_distinct_lots(variant).await?)
    }

    pub async fn list_lots_by_recency(&self, variant: RecordVariant) -> ApiResult<Vec<LotRef>> {
        Ok(self.store.list_lots_by_recency(variant).await?)
    }

    // ===== 列表 =====

    pub async fn list_all(&self, variant: RecordVariant) -> ApiResult<Vec<CountRecordView>> {
        Ok(self.store.list_all(variant).await?)
    }

    pub async fn list_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
    ) -> ApiResult<Vec<CountRecordView>> {
        let lot_id = require_text(lot_id, "Lot_id")?;
        Ok(self.store.list_by_lot(variant, lot_id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> ApiResult<Vec<CountRecord>> {
        let business_id = parse_id(business_id, "Business_id")?;
        Ok(self
            .store
            .list_by_business(RecordVariant::CountTray, business_id)
            .await?)
    }

    /// 时间区间 [start, end] 查询（两端闭合）
    pub async fn list_by_time_range(
        &self,
        variant: RecordVariant,
        start: &str,
        end: &str,
        business_id: Option<&str>,
    ) -> ApiResult<Vec<CountRecord>> {
        let start = parse_time(start, "start")?;
        let end = parse_time(end, "end")?;
        if start > end {
            return Err(ApiError::InvalidInput(
                "start must not be later than end".to_string(),
            ));
        }
        let business_id = match business_id {
            Some(raw) => Some(parse_id(raw, "Business_id")?),
            None => None,
        };
        Ok(self
            .store
            .list_by_time_range(variant, start, end, business_id)
            .await?)
    }

    // ===== 写入 =====

    /// 批量写入; 任一记录缺少必填字段则整批拒绝
    pub async fn insert_batch(
        &self,
        variant: RecordVariant,
        records: Vec<NewCountRecord>,
    ) -> ApiResult<usize> {
        if records.is_empty() {
            return Err(ApiError::InvalidInput("No records provided".to_string()));
        }
        for (index, record) in records.iter().enumerate() {
            record.check_required().map_err(|field| {
                ApiError::InvalidInput(format!("{} is required (record {})", field, index))
            })?;
        }

        let records: Vec<NewCountRecord> = records
            .into_iter()
            .map(|r| r.for_variant(variant))
            .collect();
        let inserted = self.store.insert_batch(variant, records).await?;
        info!(%variant, inserted, "计数记录批量写入完成");
        Ok(inserted)
    }

    pub async fn delete_by_lot(&self, variant: RecordVariant, lot_id: &str) -> ApiResult<usize> {
        let lot_id = require_text(lot_id, "Lot_id")?;
        let deleted = self.store.delete_by_lot(variant, lot_id).await?;
        info!(%variant, lot_id, deleted, "按批次删除计数记录");
        Ok(deleted)
    }
}
