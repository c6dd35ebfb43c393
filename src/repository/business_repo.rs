// ==========================================
// 生产计数服务 - 企业仓储
// ==========================================
// 职责: business 表 CRUD
// 说明: 主键由 MAX+1 分配, 在 IMMEDIATE 事务内完成避免并发抢号
// ==========================================

use rusqlite::{params, Connection, Result as SqliteResult, Row, TransactionBehavior};

use crate::db::DbPool;
use crate::domain::directory::Business;
use crate::repository::error::{RepositoryError, RepositoryResult};

pub struct BusinessRepository {
    pool: DbPool,
}

impl BusinessRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> RepositoryResult<Vec<Business>> {
        self.pool.run(|conn| list(conn)).await
    }

    /// 新建企业, 返回分配到的记录
    pub async fn create(&self, name: &str) -> RepositoryResult<Business> {
        let name = name.to_string();
        self.pool.run(move |conn| create(conn, &name)).await
    }

    pub async fn rename(&self, business_id: i64, name: &str) -> RepositoryResult<()> {
        let name = name.to_string();
        self.pool
            .run(move |conn| rename(conn, business_id, &name))
            .await
    }

    pub async fn delete(&self, business_id: i64) -> RepositoryResult<()> {
        self.pool.run(move |conn| delete(conn, business_id)).await
    }
}

fn map_business(row: &Row) -> SqliteResult<Business> {
    Ok(Business {
        business_id: row.get(0)?,
        business_name: row.get(1)?,
    })
}

fn not_found(business_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Business".to_string(),
        id: business_id.to_string(),
    }
}

pub(crate) fn list(conn: &Connection) -> RepositoryResult<Vec<Business>> {
    let mut stmt = conn.prepare(
        "SELECT Business_id, Business_name FROM business ORDER BY Business_id ASC",
    )?;
    let rows = stmt
        .query_map([], map_business)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn create(conn: &mut Connection, name: &str) -> RepositoryResult<Business> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let next_id: i64 = tx.query_row(
        "SELECT COALESCE(MAX(Business_id), 0) + 1 FROM business",
        [],
        |row| row.get(0),
    )?;
    tx.execute(
        "INSERT INTO business (Business_id, Business_name) VALUES (?1, ?2)",
        params![next_id, name],
    )?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    tracing::info!(business_id = next_id, "新建企业");
    Ok(Business {
        business_id: next_id,
        business_name: name.to_string(),
    })
}

pub(crate) fn rename(conn: &Connection, business_id: i64, name: &str) -> RepositoryResult<()> {
    let affected = conn.execute(
        "UPDATE business SET Business_name = ?1 WHERE Business_id = ?2",
        params![name, business_id],
    )?;
    if affected == 0 {
        return Err(not_found(business_id));
    }
    Ok(())
}

pub(crate) fn delete(conn: &Connection, business_id: i64) -> RepositoryResult<()> {
    let affected = conn.execute(
        "DELETE FROM business WHERE Business_id = ?1",
        params![business_id],
    )?;
    if affected == 0 {
        return Err(not_found(business_id));
    }
    Ok(())
}

/// 企业是否存在（机台新建前校验）
pub(crate) fn exists(conn: &Connection, business_id: i64) -> RepositoryResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM business WHERE Business_id = ?1",
        params![business_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_assigns_max_plus_one() {
        let mut conn = setup_test_db();
        let first = create(&mut conn, "Alpha").unwrap();
        let second = create(&mut conn, "Beta").unwrap();
        assert_eq!(first.business_id, 1);
        assert_eq!(second.business_id, 2);

        delete(&conn, 1).unwrap();
        let third = create(&mut conn, "Gamma").unwrap();
        assert_eq!(third.business_id, 3);

        let names: Vec<String> = list(&conn)
            .unwrap()
            .into_iter()
            .map(|b| b.business_name)
            .collect();
        assert_eq!(names, vec!["Beta".to_string(), "Gamma".to_string()]);
    }

    #[test]
    fn test_rename_and_delete_missing_return_not_found() {
        let mut conn = setup_test_db();
        create(&mut conn, "Alpha").unwrap();

        rename(&conn, 1, "Alpha Prime").unwrap();
        assert_eq!(list(&conn).unwrap()[0].business_name, "Alpha Prime");

        assert!(matches!(
            rename(&conn, 42, "x"),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(delete(&conn, 42), Err(RepositoryError::NotFound { .. })));
        assert!(exists(&conn, 1).unwrap());
        assert!(!exists(&conn, 42).unwrap());
    }
}
