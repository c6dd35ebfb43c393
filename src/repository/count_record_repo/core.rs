use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};

use super::resolution;
use crate::db::DbPool;
use crate::domain::count_record::{
    CountRecord, CountRecordView, LotRef, NewCountRecord, StationReading,
};
use crate::domain::timestamp;
use crate::domain::types::{RecordVariant, ResolutionPolicy, SnapshotProjection};
use crate::repository::count_record_store::{CountRecordStore, StationQuery};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// CountRecordRepository - 计数记录仓储
// ==========================================
// 只做数据映射, 不做参数校验
pub struct CountRecordRepository {
    pool: DbPool,
}

impl CountRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// ==========================================
// 列映射
// ==========================================

/// 记录列清单; plain 表没有 Business_id, 以 NULL 补齐保证列序一致
pub(super) fn record_columns(variant: RecordVariant, alias: &str) -> String {
    let business = if variant.has_business_id() {
        format!("{}.Business_id", alias)
    } else {
        "NULL".to_string()
    };
    format!(
        "{a}.count_id, {a}.Lot_id, {a}.Direction, {a}.Timestamp, {a}.Machine_ID, \
         {a}.Substrate, {a}.TTL, {a}.badmark, {a}.ASSY_input, {a}.NG, {a}.Good, \
         {b} AS Business_id, {a}.Judgement",
        a = alias,
        b = business
    )
}

/// 按 record_columns 的列序映射
pub(super) fn map_record(row: &Row, variant: RecordVariant) -> SqliteResult<CountRecord> {
    Ok(CountRecord {
        count_id: row.get(0)?,
        lot_id: row.get(1)?,
        direction: row.get(2)?,
        timestamp: row.get(3)?,
        machine_id: row.get(4)?,
        substrate: row.get(5)?,
        ttl: row.get(6)?,
        badmark: row.get(7)?,
        assy_input: row.get(8)?,
        ng_count: row.get(9)?,
        good_count: row.get(10)?,
        business_id: if variant.has_business_id() {
            Some(row.get(11)?)
        } else {
            None
        },
        judgement: row.get(12)?,
    })
}

/// record_columns 之后紧跟 st.Machine_name
pub(super) fn map_view(row: &Row, variant: RecordVariant) -> SqliteResult<CountRecordView> {
    Ok(CountRecordView {
        record: map_record(row, variant)?,
        machine_name: row.get(13)?,
    })
}

// ==========================================
// 写入
// ==========================================

pub(super) fn insert_batch(
    conn: &mut Connection,
    variant: RecordVariant,
    records: &[NewCountRecord],
) -> RepositoryResult<usize> {
    let table = variant.table_name();
    let tx = conn
        .transaction()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    {
        let mut stmt = tx.prepare(&format!(
            r#"
            INSERT INTO {} (
                Lot_id, Direction, Timestamp, Machine_ID, Substrate, TTL,
                badmark, ASSY_input, NG, Good, Judgement{}
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11{})
            "#,
            table,
            if variant.has_business_id() { ", Business_id" } else { "" },
            if variant.has_business_id() { ", ?12" } else { "" },
        ))?;

        for rec in records {
            let ts = timestamp::to_storage(&rec.timestamp);
            if variant.has_business_id() {
                stmt.execute(params![
                    rec.lot_id,
                    rec.direction,
                    ts,
                    rec.machine_id,
                    rec.substrate,
                    rec.ttl,
                    rec.badmark,
                    rec.assy_input,
                    rec.ng_count,
                    rec.good_count,
                    rec.judgement,
                    rec.business_id,
                ])?;
            } else {
                stmt.execute(params![
                    rec.lot_id,
                    rec.direction,
                    ts,
                    rec.machine_id,
                    rec.substrate,
                    rec.ttl,
                    rec.badmark,
                    rec.assy_input,
                    rec.ng_count,
                    rec.good_count,
                    rec.judgement,
                ])?;
            }
        }
    }

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
    Ok(records.len())
}

pub(super) fn delete_by_lot(
    conn: &Connection,
    variant: RecordVariant,
    lot_id: &str,
) -> RepositoryResult<usize> {
    let affected = conn.execute(
        &format!("DELETE FROM {} WHERE Lot_id = ?1", variant.table_name()),
        params![lot_id],
    )?;
    Ok(affected)
}

// ==========================================
// 列表
// ==========================================

pub(super) fn list_views(
    conn: &Connection,
    variant: RecordVariant,
    lot_id: Option<&str>,
) -> RepositoryResult<Vec<CountRecordView>> {
    let sql = format!(
        r#"
        SELECT {}, st.Machine_name
        FROM {} cr
        LEFT JOIN station st ON cr.Machine_ID = st.Machine_ID
        {}
        ORDER BY cr.count_id ASC
        "#,
        record_columns(variant, "cr"),
        variant.table_name(),
        if lot_id.is_some() { "WHERE cr.Lot_id = ?1" } else { "" },
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = match lot_id {
        Some(lot) => stmt
            .query_map(params![lot], |row| map_view(row, variant))?
            .collect::<SqliteResult<Vec<_>>>()?,
        None => stmt
            .query_map([], |row| map_view(row, variant))?
            .collect::<SqliteResult<Vec<_>>>()?,
    };
    Ok(rows)
}

pub(super) fn list_by_business(
    conn: &Connection,
    variant: RecordVariant,
    business_id: i64,
) -> RepositoryResult<Vec<CountRecord>> {
    if !variant.has_business_id() {
        return Err(RepositoryError::ValidationError(format!(
            "{} 表没有 Business_id 列",
            variant
        )));
    }
    let sql = format!(
        r#"
        SELECT {}
        FROM {} cr
        WHERE cr.Business_id = ?1
        ORDER BY cr.count_id ASC
        "#,
        record_columns(variant, "cr"),
        variant.table_name(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![business_id], |row| map_record(row, variant))?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

pub(super) fn list_by_time_range(
    conn: &Connection,
    variant: RecordVariant,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    business_id: Option<i64>,
) -> RepositoryResult<Vec<CountRecord>> {
    if business_id.is_some() && !variant.has_business_id() {
        return Err(RepositoryError::ValidationError(format!(
            "{} 表没有 Business_id 列",
            variant
        )));
    }
    let sql = format!(
        r#"
        SELECT {}
        FROM {} cr
        WHERE cr.Timestamp BETWEEN ?1 AND ?2
        {}
        ORDER BY cr.Timestamp ASC, cr.count_id ASC
        "#,
        record_columns(variant, "cr"),
        variant.table_name(),
        if business_id.is_some() { "AND cr.Business_id = ?3" } else { "" },
    );
    let start = timestamp::to_storage(start);
    let end = timestamp::to_storage(end);

    let mut stmt = conn.prepare(&sql)?;
    let rows = match business_id {
        Some(bid) => stmt
            .query_map(params![start, end, bid], |row| map_record(row, variant))?
            .collect::<SqliteResult<Vec<_>>>()?,
        None => stmt
            .query_map(params![start, end], |row| map_record(row, variant))?
            .collect::<SqliteResult<Vec<_>>>()?,
    };
    Ok(rows)
}

// ==========================================
// CountRecordStore 实现
// ==========================================
#[async_trait]
impl CountRecordStore for CountRecordRepository {
    async fn insert_batch(
        &self,
        variant: RecordVariant,
        records: Vec<NewCountRecord>,
    ) -> RepositoryResult<usize> {
        self.pool
            .run(move |conn| insert_batch(conn, variant, &records))
            .await
    }

    async fn delete_by_lot(&self, variant: RecordVariant, lot_id: &str) -> RepositoryResult<usize> {
        let lot_id = lot_id.to_string();
        self.pool
            .run(move |conn| delete_by_lot(conn, variant, &lot_id))
            .await
    }

    async fn list_all(&self, variant: RecordVariant) -> RepositoryResult<Vec<CountRecordView>> {
        self.pool
            .run(move |conn| list_views(conn, variant, None))
            .await
    }

    async fn list_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
    ) -> RepositoryResult<Vec<CountRecordView>> {
        let lot_id = lot_id.to_string();
        self.pool
            .run(move |conn| list_views(conn, variant, Some(&lot_id)))
            .await
    }

    async fn list_by_business(
        &self,
        variant: RecordVariant,
        business_id: i64,
    ) -> RepositoryResult<Vec<CountRecord>> {
        self.pool
            .run(move |conn| list_by_business(conn, variant, business_id))
            .await
    }

    async fn list_by_time_range(
        &self,
        variant: RecordVariant,
        start: NaiveDateTime,
        end: NaiveDateTime,
        business_id: Option<i64>,
    ) -> RepositoryResult<Vec<CountRecord>> {
        self.pool
            .run(move |conn| list_by_time_range(conn, variant, &start, &end, business_id))
            .await
    }

    async fn latest_by_lot(
        &self,
        variant: RecordVariant,
        lot_id: &str,
        policy: ResolutionPolicy,
    ) -> RepositoryResult<Option<CountRecordView>> {
        let lot_id = lot_id.to_string();
        self.pool
            .run(move |conn| resolution::latest_by_lot(conn, variant, &lot_id, policy))
            .await
    }

    async fn latest_by_station(
        &self,
        variant: RecordVariant,
        query: StationQuery,
        projection: SnapshotProjection,
    ) -> RepositoryResult<Option<StationReading>> {
        self.pool
            .run(move |conn| resolution::latest_by_station(conn, variant, &query, projection))
            .await
    }

    async fn list_distinct_lots(&self, variant: RecordVariant) -> RepositoryResult<Vec<LotRef>> {
        self.pool
            .run(move |conn| resolution::list_distinct_lots(conn, variant))
            .await
    }

    async fn list_lots_by_recency(&self, variant: RecordVariant) -> RepositoryResult<Vec<LotRef>> {
        self.pool
            .run(move |conn| resolution::list_lots_by_recency(conn, variant))
            .await
    }
}
