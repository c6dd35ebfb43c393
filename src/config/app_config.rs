// ==========================================
// 生产计数服务 - 运行配置
// ==========================================
// 来源: 环境变量, 未设置时使用默认值
// 解析失败的值记录 warn 并回退默认值, 不阻塞启动
// ==========================================

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::db::DEFAULT_POOL_SIZE;

// ===== 环境变量名 =====
pub const ENV_DB_PATH: &str = "PRODUCTION_COUNT_DB_PATH";
pub const ENV_BIND: &str = "PRODUCTION_COUNT_BIND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_JWT_SECRET: &str = "PRODUCTION_COUNT_JWT_SECRET";
pub const ENV_TOKEN_TTL_SECS: &str = "PRODUCTION_COUNT_TOKEN_TTL_SECS";
pub const ENV_BCRYPT_COST: &str = "PRODUCTION_COUNT_BCRYPT_COST";
pub const ENV_POOL_SIZE: &str = "PRODUCTION_COUNT_POOL_SIZE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PRODUCTION_COUNT_REQUEST_TIMEOUT_SECS";
pub const ENV_CORS_ORIGINS: &str = "PRODUCTION_COUNT_CORS_ORIGINS";

// ===== 默认值 =====
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3334;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

const DB_FILE_NAME: &str = "production_count.db";

/// 服务运行配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub pool_size: usize,
    pub request_timeout: Duration,
    /// 空列表表示允许任意来源
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（测试注入用）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = match text(ENV_JWT_SECRET) {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "{} 未设置, 使用不安全的默认密钥; 生产环境必须配置",
                    ENV_JWT_SECRET
                );
                INSECURE_DEFAULT_SECRET.to_string()
            }
        };

        let cors_origins = text(ENV_CORS_ORIGINS)
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            db_path: text(ENV_DB_PATH).unwrap_or_else(default_db_path),
            bind_addr: text(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: parse_or(ENV_PORT, text(ENV_PORT), DEFAULT_PORT),
            jwt_secret: SecretString::new(jwt_secret.into()),
            token_ttl_secs: parse_or(
                ENV_TOKEN_TTL_SECS,
                text(ENV_TOKEN_TTL_SECS),
                DEFAULT_TOKEN_TTL_SECS,
            ),
            bcrypt_cost: parse_or(ENV_BCRYPT_COST, text(ENV_BCRYPT_COST), DEFAULT_BCRYPT_COST),
            pool_size: parse_or(ENV_POOL_SIZE, text(ENV_POOL_SIZE), DEFAULT_POOL_SIZE),
            request_timeout: Duration::from_secs(parse_or(
                ENV_REQUEST_TIMEOUT_SECS,
                text(ENV_REQUEST_TIMEOUT_SECS),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            cors_origins,
        }
    }

    /// 监听地址 "host:port"
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "配置值无法解析, 使用默认值");
            default
        }),
        None => default,
    }
}

/// 获取默认数据库路径
///
/// 用户数据目录/production-count/production_count.db, 取不到数据目录时回退到当前目录
pub fn default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("production-count");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
