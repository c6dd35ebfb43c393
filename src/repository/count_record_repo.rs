// ==========================================
// 生产计数服务 - 计数记录仓储
// ==========================================
// 表: countrecords / countrecords_counttray
// 约束: 所有查询使用参数化, 表名只来自 RecordVariant
// ==========================================

mod core;
mod resolution;


pub use self::core::CountRecordRepository;
