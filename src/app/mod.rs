// ==========================================
// 生产计数服务 - 应用层
// ==========================================
// 职责: 组装连接池、仓储与API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
