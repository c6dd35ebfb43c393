// ==========================================
// 生产计数服务 - 用户账号
// ==========================================

use serde::{Deserialize, Serialize};

/// 用户账号
///
/// password_hash 为 bcrypt 散列, 永不序列化输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub fname: Option<String>,
    pub lname: Option<String>,
}

/// 注册时写入的账号（密码已散列）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub fname: Option<String>,
    pub lname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            fname: Some("A".to_string()),
            lname: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password"));
    }
}
