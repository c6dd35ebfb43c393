// ==========================================
// 生产计数服务 - 计数记录实体
// ==========================================
// 对外 JSON 字段名沿用数据库列名（Lot_id / Machine_ID / ...）
// 记录写入后不可变, 只支持按批次整体删除
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::RecordVariant;

// ==========================================
// CountRecord - 已持久化的计数记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecord {
    /// 存储分配的自增主键, 只增不复用
    pub count_id: i64,

    #[serde(rename = "Lot_id")]
    pub lot_id: String,

    #[serde(rename = "Direction")]
    pub direction: String,

    #[serde(rename = "Timestamp", with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,

    #[serde(rename = "Machine_ID")]
    pub machine_id: i64,

    #[serde(rename = "Substrate")]
    pub substrate: Option<i64>,

    #[serde(rename = "TTL")]
    pub ttl: Option<i64>,

    pub badmark: Option<i64>,

    #[serde(rename = "ASSY_input")]
    pub assy_input: Option<i64>,

    #[serde(rename = "NG")]
    pub ng_count: Option<i64>,

    #[serde(rename = "Good")]
    pub good_count: Option<i64>,

    /// 外层 None: 表中没有该列（plain, 输出不带该键）
    /// Some(None): counttray 行的 NULL, 输出 null
    #[serde(
        rename = "Business_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub business_id: Option<Option<i64>>,

    #[serde(rename = "Judgement")]
    pub judgement: Option<String>,
}

// ==========================================
// CountRecordView - 关联机台名称的记录
// ==========================================
/// LEFT JOIN station 得到的记录; 机台未登记时 Machine_name 为 null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecordView {
    #[serde(flatten)]
    pub record: CountRecord,

    #[serde(rename = "Machine_name")]
    pub machine_name: Option<String>,
}

// ==========================================
// NewCountRecord - 采集端提交的记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCountRecord {
    #[serde(rename = "Lot_id")]
    pub lot_id: String,

    #[serde(rename = "Direction")]
    pub direction: String,

    #[serde(rename = "Timestamp", with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,

    #[serde(rename = "Machine_ID")]
    pub machine_id: i64,

    #[serde(rename = "Substrate", default)]
    pub substrate: Option<i64>,

    #[serde(rename = "TTL", default)]
    pub ttl: Option<i64>,

    #[serde(default)]
    pub badmark: Option<i64>,

    #[serde(rename = "ASSY_input", default)]
    pub assy_input: Option<i64>,

    #[serde(rename = "NG", default)]
    pub ng_count: Option<i64>,

    #[serde(rename = "Good", default)]
    pub good_count: Option<i64>,

    /// plain 表写入时忽略
    #[serde(rename = "Business_id", default)]
    pub business_id: Option<i64>,

    #[serde(rename = "Judgement", default)]
    pub judgement: Option<String>,
}

impl NewCountRecord {
    /// 构造只含必填字段的记录（测试/生成器使用）
    pub fn new(lot_id: &str, direction: &str, timestamp: NaiveDateTime, machine_id: i64) -> Self {
        Self {
            lot_id: lot_id.to_string(),
            direction: direction.to_string(),
            timestamp,
            machine_id,
            substrate: None,
            ttl: None,
            badmark: None,
            assy_input: None,
            ng_count: None,
            good_count: None,
            business_id: None,
            judgement: None,
        }
    }

    pub fn with_judgement(mut self, judgement: &str) -> Self {
        self.judgement = Some(judgement.to_string());
        self
    }

    pub fn with_business(mut self, business_id: i64) -> Self {
        self.business_id = Some(business_id);
        self
    }

    /// 写入前校验必填字段
    ///
    /// 返回 Err(字段名) 表示该字段为空
    pub fn check_required(&self) -> Result<(), &'static str> {
        if self.lot_id.trim().is_empty() {
            return Err("Lot_id");
        }
        if self.direction.trim().is_empty() {
            return Err("Direction");
        }
        Ok(())
    }

    /// 按目标表裁剪字段
    pub fn for_variant(mut self, variant: RecordVariant) -> Self {
        if !variant.has_business_id() {
            self.business_id = None;
        }
        self
    }
}

// ==========================================
// 机台快照 (Position / PositionCBM)
// ==========================================

/// Position 接口返回的位置字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    #[serde(rename = "Lot_id")]
    pub lot_id: String,

    #[serde(rename = "Timestamp", with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,

    #[serde(rename = "Direction")]
    pub direction: String,

    #[serde(rename = "Machine_ID")]
    pub machine_id: i64,

    #[serde(rename = "Substrate")]
    pub substrate: Option<i64>,

    #[serde(rename = "TTL")]
    pub ttl: Option<i64>,
}

/// PositionCBM 接口: 位置字段 + 计数字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshotDetail {
    #[serde(flatten)]
    pub snapshot: StationSnapshot,

    pub badmark: Option<i64>,

    #[serde(rename = "ASSY_input")]
    pub assy_input: Option<i64>,

    #[serde(rename = "NG")]
    pub ng_count: Option<i64>,

    #[serde(rename = "Good")]
    pub good_count: Option<i64>,
}

/// 机台最新快照（按投影不同返回不同字段集）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StationReading {
    Position(StationSnapshot),
    Detail(StationSnapshotDetail),
}

impl StationReading {
    pub fn snapshot(&self) -> &StationSnapshot {
        match self {
            StationReading::Position(s) => s,
            StationReading::Detail(d) => &d.snapshot,
        }
    }
}

/// 批次号投影（Lot_id 列表接口）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRef {
    #[serde(rename = "Lot_id")]
    pub lot_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_record_deserializes_original_payload() {
        let raw = r#"{
            "ASSY_input": 19000, "Direction": "out", "Good": 5500,
            "Lot_id": "Y12345TL.03", "Machine_ID": 4, "NG": 12,
            "Substrate": 0, "TTL": 5512, "Timestamp": "2024-01-02 10:00:00",
            "badmark": 0, "count_id": 1
        }"#;
        let rec: NewCountRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.lot_id, "Y12345TL.03");
        assert_eq!(rec.machine_id, 4);
        assert_eq!(rec.ttl, Some(5512));
        assert_eq!(rec.timestamp, sample_ts());
        assert!(rec.judgement.is_none());
        assert!(rec.check_required().is_ok());
    }

    #[test]
    fn test_check_required_reports_field() {
        let rec = NewCountRecord::new("  ", "in", sample_ts(), 1);
        assert_eq!(rec.check_required(), Err("Lot_id"));
        let rec = NewCountRecord::new("L1", "", sample_ts(), 1);
        assert_eq!(rec.check_required(), Err("Direction"));
    }

    #[test]
    fn test_for_variant_drops_business_on_plain() {
        let rec = NewCountRecord::new("L1", "in", sample_ts(), 1).with_business(7);
        assert_eq!(rec.clone().for_variant(RecordVariant::Plain).business_id, None);
        assert_eq!(rec.for_variant(RecordVariant::CountTray).business_id, Some(7));
    }

    #[test]
    fn test_view_serializes_flat_with_null_machine_name() {
        let view = CountRecordView {
            record: CountRecord {
                count_id: 3,
                lot_id: "L1".to_string(),
                direction: "out".to_string(),
                timestamp: sample_ts(),
                machine_id: 9,
                substrate: Some(0),
                ttl: None,
                badmark: None,
                assy_input: None,
                ng_count: None,
                good_count: None,
                business_id: None,
                judgement: Some("Correct".to_string()),
            },
            machine_name: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["Lot_id"], "L1");
        assert_eq!(json["Timestamp"], "2024-01-02 10:00:00");
        assert!(json["Machine_name"].is_null());
        assert!(json.get("Business_id").is_none());
        assert_eq!(json["Judgement"], "Correct");
    }

    #[test]
    fn test_counttray_null_business_serializes_as_null() {
        let mut record = CountRecord {
            count_id: 1,
            lot_id: "L1".to_string(),
            direction: "in".to_string(),
            timestamp: sample_ts(),
            machine_id: 2,
            substrate: None,
            ttl: None,
            badmark: None,
            assy_input: None,
            ng_count: None,
            good_count: None,
            business_id: Some(None),
            judgement: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["Business_id"].is_null());
        assert!(json.as_object().unwrap().contains_key("Business_id"));

        record.business_id = Some(Some(4));
        assert_eq!(serde_json::to_value(&record).unwrap()["Business_id"], 4);
    }
}
