// ==========================================
// 生产计数服务 - 领域模型层
// ==========================================
// 职责: 定义实体与类型
// 约束: 不含数据访问逻辑
// ==========================================

pub mod count_record;
pub mod directory;
pub mod timestamp;
pub mod types;
pub mod user;

// 重导出核心类型
pub use count_record::{
    CountRecord, CountRecordView, LotRef, NewCountRecord, StationReading, StationSnapshot,
    StationSnapshotDetail,
};
pub use directory::{Business, Station};
pub use types::{
    RecordVariant, ResolutionPolicy, SnapshotProjection, DIRECTION_IN, DIRECTION_OUT,
    JUDGEMENT_CORRECT,
};
pub use user::{NewUser, User};
