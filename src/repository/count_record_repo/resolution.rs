// ==========================================
// 批次/机台当前记录解析
// ==========================================
// 按批次: 以 Machine_ID 最大者代表产线上走得最远的工位
//   - 业务约定: 机台号按产线顺序分配; 机台重新编号或批次回流到前序工位时该口径失效
//   - 同机台并列时 out 优先（out=1, 其它=2）, 仍并列取 count_id 最大者
// 按机台: 真实时间口径, Timestamp 最大者, 并列取 count_id 最大者
// 每个查询都是单条 SQL, 不做多次往返
// ==========================================

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::core::{map_view, record_columns};
use crate::domain::count_record::{
    CountRecordView, LotRef, StationReading, StationSnapshot, StationSnapshotDetail,
};
use crate::domain::types::{
    RecordVariant, ResolutionPolicy, SnapshotProjection, DIRECTION_OUT, JUDGEMENT_CORRECT,
};
use crate::repository::count_record_store::StationQuery;
use crate::repository::error::RepositoryResult;

// ==========================================
// 按批次
// ==========================================

/// 组装按批次解析 SQL
///
/// 参数: ?1 = Lot_id, ?2 = 'out', ?3 = 'Correct'（仅 LatestCorrect）
pub(super) fn latest_by_lot_sql(variant: RecordVariant, policy: ResolutionPolicy) -> String {
    let table = variant.table_name();
    let (outer_filter, inner_filter) = match policy {
        ResolutionPolicy::Latest => ("", ""),
        ResolutionPolicy::LatestCorrect => ("AND cr.Judgement = ?3", "AND sub.Judgement = ?3"),
    };

    format!(
        r#"
        SELECT {columns}, st.Machine_name
        FROM {table} cr
        LEFT JOIN station st ON cr.Machine_ID = st.Machine_ID
        WHERE cr.Lot_id = ?1
          {outer_filter}
          AND cr.Machine_ID = (
              SELECT MAX(sub.Machine_ID)
              FROM {table} sub
              WHERE sub.Lot_id = cr.Lot_id
                {inner_filter}
          )
        ORDER BY
            CASE WHEN cr.Direction = ?2 THEN 1 ELSE 2 END,
            cr.count_id DESC
        LIMIT 1
        "#,
        columns = record_columns(variant, "cr"),
        table = table,
        outer_filter = outer_filter,
        inner_filter = inner_filter,
    )
}

pub(super) fn latest_by_lot(
    conn: &Connection,
    variant: RecordVariant,
    lot_id: &str,
    policy: ResolutionPolicy,
) -> RepositoryResult<Option<CountRecordView>> {
    let sql = latest_by_lot_sql(variant, policy);
    let mut stmt = conn.prepare(&sql)?;

    let found = match policy {
        ResolutionPolicy::Latest => stmt
            .query_row(params![lot_id, DIRECTION_OUT], |row| map_view(row, variant))
            .optional()?,
        ResolutionPolicy::LatestCorrect => stmt
            .query_row(params![lot_id, DIRECTION_OUT, JUDGEMENT_CORRECT], |row| {
                map_view(row, variant)
            })
            .optional()?,
    };

    tracing::debug!(
        table = variant.table_name(),
        lot_id,
        %policy,
        found = found.is_some(),
        "按批次解析当前记录"
    );
    Ok(found)
}

// ==========================================
// 按机台
// ==========================================

const POSITION_COLUMNS: &str = "Lot_id, Timestamp, Direction, Machine_ID, Substrate, TTL";
const DETAIL_COLUMNS: &str =
    "Lot_id, Timestamp, Direction, Machine_ID, Substrate, TTL, badmark, ASSY_input, NG, Good";

/// 组装按机台解析 SQL
///
/// 参数: ?1 = Machine_ID, ?2 = Direction, ?3 = Lot_id（可选）
pub(super) fn latest_by_station_sql(
    variant: RecordVariant,
    projection: SnapshotProjection,
    with_lot: bool,
) -> String {
    let columns = match projection {
        SnapshotProjection::Position => POSITION_COLUMNS,
        SnapshotProjection::Detail => DETAIL_COLUMNS,
    };
    format!(
        r#"
        SELECT {}
        FROM {}
        WHERE Machine_ID = ?1 AND Direction = ?2 {}
        ORDER BY Timestamp DESC, count_id DESC
        LIMIT 1
        "#,
        columns,
        variant.table_name(),
        if with_lot { "AND Lot_id = ?3" } else { "" },
    )
}

fn map_snapshot(row: &Row) -> SqliteResult<StationSnapshot> {
    Ok(StationSnapshot {
        lot_id: row.get(0)?,
        timestamp: row.get(1)?,
        direction: row.get(2)?,
        machine_id: row.get(3)?,
        substrate: row.get(4)?,
        ttl: row.get(5)?,
    })
}

fn map_reading(row: &Row, projection: SnapshotProjection) -> SqliteResult<StationReading> {
    let snapshot = map_snapshot(row)?;
    Ok(match projection {
        SnapshotProjection::Position => StationReading::Position(snapshot),
        SnapshotProjection::Detail => StationReading::Detail(StationSnapshotDetail {
            snapshot,
            badmark: row.get(6)?,
            assy_input: row.get(7)?,
            ng_count: row.get(8)?,
            good_count: row.get(9)?,
        }),
    })
}

pub(super) fn latest_by_station(
    conn: &Connection,
    variant: RecordVariant,
    query: &StationQuery,
    projection: SnapshotProjection,
) -> RepositoryResult<Option<StationReading>> {
    let sql = latest_by_station_sql(variant, projection, query.lot_id.is_some());
    let mut stmt = conn.prepare(&sql)?;

    let found = match &query.lot_id {
        Some(lot_id) => stmt
            .query_row(
                params![query.machine_id, query.direction, lot_id],
                |row| map_reading(row, projection),
            )
            .optional()?,
        None => stmt
            .query_row(params![query.machine_id, query.direction], |row| {
                map_reading(row, projection)
            })
            .optional()?,
    };
    Ok(found)
}

// ==========================================
// 批次号列表
// ==========================================

fn map_lot(row: &Row) -> SqliteResult<LotRef> {
    Ok(LotRef { lot_id: row.get(0)? })
}

/// 去重批次号（按批次号升序, 便于稳定输出）
pub(super) fn list_distinct_lots(
    conn: &Connection,
    variant: RecordVariant,
) -> RepositoryResult<Vec<LotRef>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT Lot_id FROM {} ORDER BY Lot_id ASC",
        variant.table_name()
    ))?;
    let rows = stmt
        .query_map([], map_lot)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

/// 去重批次号, 按该批次最大 count_id 倒序（最近写入的批次在前）
pub(super) fn list_lots_by_recency(
    conn: &Connection,
    variant: RecordVariant,
) -> RepositoryResult<Vec<LotRef>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT Lot_id
        FROM {}
        GROUP BY Lot_id
        ORDER BY MAX(count_id) DESC
        "#,
        variant.table_name()
    ))?;
    let rows = stmt
        .query_map([], map_lot)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}
