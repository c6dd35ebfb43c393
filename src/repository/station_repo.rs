// ==========================================
// 生产计数服务 - 机台仓储
// ==========================================
// 职责: station 表 CRUD
// 约束: 企业过滤一律参数化绑定
// 新建流程（单事务）: 校验企业存在 -> MAX+1 分配 Machine_ID -> 写入 -> 提交
// ==========================================

use rusqlite::{params, Connection, Result as SqliteResult, Row, TransactionBehavior};

use crate::db::DbPool;
use crate::domain::directory::Station;
use crate::repository::business_repo;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct StationRepository {
    pool: DbPool,
}

impl StationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, business_id: Option<i64>) -> RepositoryResult<Vec<Station>> {
        self.pool.run(move |conn| list(conn, business_id)).await
    }

    /// 新建机台, 返回分配的 Machine_ID
    ///
    /// # 错误
    /// - ForeignKeyViolation: 企业不存在（事务已回滚）
    pub async fn create(&self, name: &str, business_id: i64) -> RepositoryResult<i64> {
        let name = name.to_string();
        self.pool
            .run(move |conn| create(conn, &name, business_id))
            .await
    }

    pub async fn rename(&self, machine_id: i64, name: &str) -> RepositoryResult<()> {
        let name = name.to_string();
        self.pool
            .run(move |conn| rename(conn, machine_id, &name))
            .await
    }

    pub async fn delete(&self, machine_id: i64) -> RepositoryResult<()> {
        self.pool.run(move |conn| delete(conn, machine_id)).await
    }
}

fn map_station(row: &Row) -> SqliteResult<Station> {
    Ok(Station {
        machine_id: row.get(0)?,
        machine_name: row.get(1)?,
        business_id: row.get(2)?,
    })
}

fn not_found(machine_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Station".to_string(),
        id: machine_id.to_string(),
    }
}

pub(crate) fn list(conn: &Connection, business_id: Option<i64>) -> RepositoryResult<Vec<Station>> {
    let rows = match business_id {
        Some(bid) => {
            let mut stmt = conn.prepare(
                r#"
                SELECT Machine_ID, Machine_name, Business_id
                FROM station
                WHERE Business_id = ?1
                ORDER BY Machine_ID ASC
                "#,
            )?;
            let rows = stmt
                .query_map(params![bid], map_station)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT Machine_ID, Machine_name, Business_id FROM station ORDER BY Machine_ID ASC",
            )?;
            let rows = stmt
                .query_map([], map_station)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        }
    };
    Ok(rows)
}

pub(crate) fn create(conn: &mut Connection, name: &str, business_id: i64) -> RepositoryResult<i64> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    // tx 未提交即 drop, 自动回滚
    if !business_repo::exists(&tx, business_id)? {
        return Err(RepositoryError::ForeignKeyViolation(format!(
            "Business_id={} 不存在",
            business_id
        )));
    }

    let next_id: i64 = tx.query_row(
        "SELECT COALESCE(MAX(Machine_ID), 0) + 1 FROM station",
        [],
        |row| row.get(0),
    )?;
    tx.execute(
        "INSERT INTO station (Machine_ID, Machine_name, Business_id) VALUES (?1, ?2, ?3)",
        params![next_id, name, business_id],
    )?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    tracing::info!(machine_id = next_id, business_id, "新建机台");
    Ok(next_id)
}

pub(crate) fn rename(conn: &Connection, machine_id: i64, name: &str) -> RepositoryResult<()> {
    let affected = conn.execute(
        "UPDATE station SET Machine_name = ?1 WHERE Machine_ID = ?2",
        params![name, machine_id],
    )?;
    if affected == 0 {
        return Err(not_found(machine_id));
    }
    Ok(())
}

pub(crate) fn delete(conn: &Connection, machine_id: i64) -> RepositoryResult<()> {
    let affected = conn.execute(
        "DELETE FROM station WHERE Machine_ID = ?1",
        params![machine_id],
    )?;
    if affected == 0 {
        return Err(not_found(machine_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        business_repo::create(&mut conn, "Alpha").unwrap();
        business_repo::create(&mut conn, "Beta").unwrap();
        conn
    }

    #[test]
    fn test_create_and_filter_by_business() {
        let mut conn = setup_test_db();
        assert_eq!(create(&mut conn, "Reflow", 1).unwrap(), 1);
        assert_eq!(create(&mut conn, "AOI", 2).unwrap(), 2);
        assert_eq!(create(&mut conn, "Mounter", 1).unwrap(), 3);

        let alpha: Vec<i64> = list(&conn, Some(1))
            .unwrap()
            .into_iter()
            .map(|s| s.machine_id)
            .collect();
        assert_eq!(alpha, vec![1, 3]);
        assert_eq!(list(&conn, None).unwrap().len(), 3);
        assert!(list(&conn, Some(99)).unwrap().is_empty());
    }

    #[test]
    fn test_create_with_unknown_business_rolls_back() {
        let mut conn = setup_test_db();
        let result = create(&mut conn, "Ghost", 99);
        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
        assert!(list(&conn, None).unwrap().is_empty());

        // 回滚后连接可继续使用
        assert_eq!(create(&mut conn, "Reflow", 1).unwrap(), 1);
    }

    #[test]
    fn test_rename_and_delete() {
        let mut conn = setup_test_db();
        create(&mut conn, "Reflow", 1).unwrap();

        rename(&conn, 1, "Reflow-1").unwrap();
        assert_eq!(list(&conn, None).unwrap()[0].machine_name, "Reflow-1");
        assert!(matches!(rename(&conn, 7, "x"), Err(RepositoryError::NotFound { .. })));

        delete(&conn, 1).unwrap();
        assert!(matches!(delete(&conn, 1), Err(RepositoryError::NotFound { .. })));
    }
}
