// ==========================================
// 生产计数服务 - SQLite 连接池与建表
// ==========================================
// 目标:
// - 连接由 deadpool-sqlite 连接池统一管理, 每次调用借出、结束即归还
// - 统一每个连接的 PRAGMA（外键 / busy_timeout）
// - 启动时幂等建表, 不做迁移
// ==========================================

use deadpool_sqlite::{Config, Pool, PoolConfig, Runtime};
use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

use crate::repository::error::{RepositoryError, RepositoryResult};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 默认连接池大小
pub const DEFAULT_POOL_SIZE: usize = 8;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

// ==========================================
// DbPool - 连接池句柄
// ==========================================

/// 连接池句柄（克隆开销很小, 可在各仓储间共享）
#[derive(Clone)]
pub struct DbPool {
    pool: Pool,
}

impl DbPool {
    /// 按数据库文件路径创建连接池
    ///
    /// 注意: `:memory:` 下每个连接都是独立的库, 连接池场景请使用文件库
    pub fn open(db_path: &str, max_size: usize) -> RepositoryResult<Self> {
        let mut cfg = Config::new(db_path);
        cfg.pool = Some(PoolConfig::new(max_size.max(1)));
        let pool = cfg
            .create_pool(Runtime::Tokio1)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self { pool })
    }

    /// 借出一个连接并在阻塞线程上执行闭包
    ///
    /// 连接在闭包结束后归还连接池（包括出错路径）
    pub async fn run<F, R>(&self, f: F) -> RepositoryResult<R>
    where
        F: FnOnce(&mut Connection) -> RepositoryResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.pool.get().await?;
        conn.interact(move |conn| {
            configure_sqlite_connection(conn)?;
            f(conn)
        })
        .await?
    }

    /// 启动时建表
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        self.run(|conn| {
            init_schema(conn)?;
            Ok(())
        })
        .await
    }

    /// 连通性检查（健康检查使用）
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    /// 当前连接池状态: (已创建连接数, 空闲连接数)
    pub fn status(&self) -> (usize, usize) {
        let status = self.pool.status();
        (status.size, status.available as usize)
    }
}

// ==========================================
// 建表（幂等）
// ==========================================

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    fname TEXT,
    lname TEXT
);

CREATE TABLE IF NOT EXISTS business (
    Business_id INTEGER PRIMARY KEY,
    Business_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS station (
    Machine_ID INTEGER PRIMARY KEY,
    Machine_name TEXT NOT NULL,
    Business_id INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_station_business
    ON station(Business_id);

CREATE TABLE IF NOT EXISTS countrecords (
    count_id INTEGER PRIMARY KEY AUTOINCREMENT,
    Lot_id TEXT NOT NULL,
    Direction TEXT NOT NULL,
    Timestamp TEXT NOT NULL,
    Machine_ID INTEGER NOT NULL,
    Substrate INTEGER,
    TTL INTEGER,
    badmark INTEGER,
    ASSY_input INTEGER,
    NG INTEGER,
    Good INTEGER,
    Judgement TEXT
);

CREATE INDEX IF NOT EXISTS idx_countrecords_lot_machine
    ON countrecords(Lot_id, Machine_ID);
CREATE INDEX IF NOT EXISTS idx_countrecords_machine_direction_ts
    ON countrecords(Machine_ID, Direction, Timestamp);
CREATE INDEX IF NOT EXISTS idx_countrecords_ts
    ON countrecords(Timestamp);

CREATE TABLE IF NOT EXISTS countrecords_counttray (
    count_id INTEGER PRIMARY KEY AUTOINCREMENT,
    Lot_id TEXT NOT NULL,
    Direction TEXT NOT NULL,
    Timestamp TEXT NOT NULL,
    Machine_ID INTEGER NOT NULL,
    Substrate INTEGER,
    TTL INTEGER,
    badmark INTEGER,
    ASSY_input INTEGER,
    NG INTEGER,
    Good INTEGER,
    Business_id INTEGER,
    Judgement TEXT
);

CREATE INDEX IF NOT EXISTS idx_counttray_lot_machine
    ON countrecords_counttray(Lot_id, Machine_ID);
CREATE INDEX IF NOT EXISTS idx_counttray_machine_direction_ts
    ON countrecords_counttray(Machine_ID, Direction, Timestamp);
CREATE INDEX IF NOT EXISTS idx_counttray_business_ts
    ON countrecords_counttray(Business_id, Timestamp);
"#;

/// 创建全部表与索引, 并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
