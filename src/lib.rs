// ==========================================
// 生产计数服务 - 核心库
// ==========================================
// 技术栈: axum + deadpool-sqlite + SQLite
// 系统定位: 产线计数记录的采集写入与批次/机台当前位置查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接池/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// HTTP 服务层
pub mod server;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RecordVariant, ResolutionPolicy, SnapshotProjection};

// 领域实体
pub use domain::{CountRecord, CountRecordView, NewCountRecord, StationReading};

// API
pub use api::{ApiError, ApiResult, AuthApi, CountRecordApi, DirectoryApi};

// 应用
pub use app::AppState;
pub use config::AppConfig;
pub use server::build_router;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产计数服务";
