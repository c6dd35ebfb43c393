// ==========================================
// 生产计数服务 - 时间戳格式
// ==========================================
// 存储: "YYYY-MM-DD HH:MM:SS.ffffff" 定宽微秒, 文本排序即时间排序
// 输出: "YYYY-MM-DD HH:MM:SS"
// 输入兼容 ISO-8601 ("T" 分隔, 可带小数秒)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

/// 对外输出格式
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 存储格式; 小数位定宽, 同一秒内的先后也能按文本比较
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// 解析时间戳文本
///
/// 也接受带时区的 RFC3339（转为 UTC 后去掉时区）
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ACCEPTED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// 格式化为对外输出格式
pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(CANONICAL_FORMAT).to_string()
}

/// 格式化为存储格式（写入与区间比较都必须使用）
pub fn to_storage(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// serde: `#[serde(with = "crate::domain::timestamp")]`
pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("无法解析时间戳: {}", raw)))
}
