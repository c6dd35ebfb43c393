// ==========================================
// 生产计数服务 - API 层
// ==========================================
// 职责: 参数校验 + 调用仓储, 供 HTTP 路由调用
// ==========================================

pub mod auth_api;
pub mod count_record_api;
pub mod directory_api;
pub mod error;

// 重导出核心类型
pub use auth_api::{AuthApi, Claims, LoginOutcome, LoginRequest, RegisterRequest, TokenService};
pub use count_record_api::CountRecordApi;
pub use directory_api::DirectoryApi;
pub use error::{ApiError, ApiResult};
