// ==========================================
// 生产计数服务 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 表名只来自 RecordVariant 常量
// ==========================================

pub mod business_repo;
pub mod count_record_repo;
pub mod count_record_store;
pub mod error;
pub mod station_repo;
pub mod user_repo;

// 重导出核心仓储
pub use business_repo::BusinessRepository;
pub use count_record_repo::CountRecordRepository;
pub use count_record_store::{CountRecordStore, StationQuery};
pub use error::{RepositoryError, RepositoryResult};
pub use station_repo::StationRepository;
pub use user_repo::UserRepository;
