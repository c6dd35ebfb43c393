// ==========================================
// 生产计数服务 - 领域类型定义
// ==========================================
// 记录库分为两套并行表: countrecords / countrecords_counttray
// 两套表查询语义一致, counttray 多一列 Business_id
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 出料方向（同机台并列时优先）
pub const DIRECTION_OUT: &str = "out";

/// 进料方向
pub const DIRECTION_IN: &str = "in";

/// 判定结果: 正确
pub const JUDGEMENT_CORRECT: &str = "Correct";

// ==========================================
// 记录库变体 (Record Variant)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordVariant {
    /// countrecords 表
    Plain,
    /// countrecords_counttray 表（带 Business_id）
    CountTray,
}

impl RecordVariant {
    /// 对应的物理表名
    ///
    /// 表名只来自该枚举, 拼接进 SQL 是安全的; 其余取值一律走参数绑定
    pub fn table_name(self) -> &'static str {
        match self {
            RecordVariant::Plain => "countrecords",
            RecordVariant::CountTray => "countrecords_counttray",
        }
    }

    /// 是否带 Business_id 列
    pub fn has_business_id(self) -> bool {
        matches!(self, RecordVariant::CountTray)
    }

    pub fn all() -> [RecordVariant; 2] {
        [RecordVariant::Plain, RecordVariant::CountTray]
    }
}

impl fmt::Display for RecordVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

// ==========================================
// 解析策略 (Resolution Policy)
// ==========================================
// 按批次取"当前"记录时的过滤口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionPolicy {
    /// 不过滤判定结果
    Latest,
    /// 仅 Judgement = 'Correct' 的记录参与
    LatestCorrect,
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::Latest => write!(f, "LATEST"),
            ResolutionPolicy::LatestCorrect => write!(f, "LATEST_CORRECT"),
        }
    }
}

// ==========================================
// 机台快照投影 (Snapshot Projection)
// ==========================================
// Position 只返回位置字段, PositionCBM 额外返回计数字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotProjection {
    Position,
    Detail,
}
