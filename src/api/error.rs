// ==========================================
// 生产计数服务 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换Repository错误为对外错误
// 约束: 数据库细节只进日志, 不进响应体
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 对外统一的 500 文案
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// 机台查询无结果时的文案
pub const NO_DATA_MESSAGE: &str = "No data found";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 客户端错误
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// 机台快照查询无匹配记录
    #[error("No data found")]
    NoData,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    /// 连接池借出超时
    #[error("服务繁忙: {0}")]
    ServiceUnavailable(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) | ApiError::NoData => 404,
            ApiError::Conflict(_) => 409,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_) => 500,
        }
    }

    /// 响应体中的 message; 服务端错误统一脱敏
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::NoData => NO_DATA_MESSAGE.to_string(),
            ApiError::ServiceUnavailable(_) => "Service Unavailable".to_string(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} not found (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::PoolTimeout(msg) => ApiError::ServiceUnavailable(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
