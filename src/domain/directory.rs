// ==========================================
// 生产计数服务 - 企业与机台
// ==========================================
// 参考实体, 只做 CRUD, 不参与批次解析
// ==========================================

use serde::{Deserialize, Serialize};

/// 企业
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    #[serde(rename = "Business_id")]
    pub business_id: i64,

    #[serde(rename = "Business_name")]
    pub business_name: String,
}

/// 机台（工位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "Machine_ID")]
    pub machine_id: i64,

    #[serde(rename = "Machine_name")]
    pub machine_name: String,

    #[serde(rename = "Business_id")]
    pub business_id: i64,
}
