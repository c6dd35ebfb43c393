// ==========================================
// 生产计数服务 - 计数记录 Store Trait
// ==========================================
// 职责: 定义计数记录数据访问接口（两套表共用）
// 约束: Store 只做数据映射, 参数校验在 API 层完成
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::count_record::{
    CountRecord, CountRecordView, LotRef, NewCountRecord, StationReading,
};
use crate::domain::types::{RecordVariant, ResolutionPolicy, SnapshotProjection};
use crate::repository::error::RepositoryResult;

/// 机台最新记录查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationQuery {
    pub machine_id: i64,
    pub direction: String,
    /// 可选批次过滤
    pub lot_id: Option<String>,
}

// ==========================================
// CountRecordStore Trait
// ==========================================
// 实现者: CountRecordRepository（deadpool-sqlite + rusqlite）
#[async_trait]
pub trait CountRecordStore: Send + Sync {
    // ===== 写入 =====

    /// 批量写入（单事务, 全部成功或全部回滚）
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    async fn insert_batch(
        &self,
        variant: RecordVariant,
        records: Vec<NewCountRecord>,
    ) -> RepositoryResult<usize>;

    /// 按批次整体删除, 返回删除行数
    async fn delete_by_lot(&self, variant: RecordVariant, lot_id: &str) -> RepositoryResult<usize>;

    // ===== 列表 =====

    /// 全部记录（关联机台名称）
    async fn list_all(&self, variant: RecordVariant) -> RepositoryResult<Vec<CountRecordView>>;

    /// 单批次全部记录（关联机台名称）
    async fn list_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
    ) -> RepositoryResult<Vec<CountRecordView>>;

    /// 按企业过滤（仅 counttray）
    async fn list_by_business(
        &self,
        variant: RecordVariant,
        business_id: i64,
    ) -> RepositoryResult<Vec<CountRecord>>;

    /// 时间区间 [start, end] 内的记录, 可选按企业过滤
    async fn list_by_time_range(
        &self,
        variant: RecordVariant,
        start: NaiveDateTime,
        end: NaiveDateTime,
        business_id: Option<i64>,
    ) -> RepositoryResult<Vec<CountRecord>>;

    // ===== 批次解析 =====

    /// 批次当前记录（机台号最大者, 同机台优先 out）
    async fn latest_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
        policy: ResolutionPolicy,
    ) -> RepositoryResult<Option<CountRecordView>>;

    /// 机台+方向（+批次）下时间戳最新的记录
    async fn latest_by_station(
        &self,
        variant: RecordVariant,
        query: StationQuery,
        projection: SnapshotProjection,
    ) -> RepositoryResult<Option<StationReading>>;

    /// 去重批次号
    async fn list_distinct_lots(&self, variant: RecordVariant) -> RepositoryResult<Vec<LotRef>>;

    /// 去重批次号, 按最近写入倒序
    async fn list_lots_by_recency(&self, variant: RecordVariant) -> RepositoryResult<Vec<LotRef>>;
}
