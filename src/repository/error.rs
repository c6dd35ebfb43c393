// ==========================================
// 生产计数服务 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("连接池获取超时: {0}")]
    PoolTimeout(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 连接池错误: 超时单独区分, 其余视为连接失败
impl From<deadpool_sqlite::PoolError> for RepositoryError {
    fn from(err: deadpool_sqlite::PoolError) -> Self {
        match err {
            deadpool_sqlite::PoolError::Timeout(kind) => {
                RepositoryError::PoolTimeout(format!("{:?}", kind))
            }
            deadpool_sqlite::PoolError::Closed => {
                RepositoryError::DatabaseConnectionError("连接池已关闭".to_string())
            }
            other => RepositoryError::DatabaseConnectionError(other.to_string()),
        }
    }
}

// interact 闭包在阻塞线程中 panic 或被中止
impl From<deadpool_sqlite::InteractError> for RepositoryError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        match err {
            deadpool_sqlite::InteractError::Panic(_) => {
                RepositoryError::InternalError("数据库任务 panic".to_string())
            }
            _ => {
                RepositoryError::DatabaseConnectionError("数据库任务被中止".to_string())
            }
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_unique_failure_maps_to_constraint_violation() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(2067),
            Some("UNIQUE constraint failed: users.email".to_string()),
        );
        let err: RepositoryError = sqlite_err.into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }
}
