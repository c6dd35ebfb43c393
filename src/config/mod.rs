// ==========================================
// 生产计数服务 - 配置层
// ==========================================
// 职责: 读取运行配置（环境变量 + 默认值）
// ==========================================

pub mod app_config;

pub use app_config::{default_db_path, AppConfig};
