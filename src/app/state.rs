// ==========================================
// 生产计数服务 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共用同一个 deadpool-sqlite 连接池
// ==========================================

use std::sync::Arc;

use crate::api::{AuthApi, CountRecordApi, DirectoryApi, TokenService};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::repository::{
    BusinessRepository, CountRecordRepository, CountRecordStore, RepositoryResult,
    StationRepository, UserRepository,
};

/// 应用状态
///
/// 克隆开销很小（内部全部是 Arc）, 作为 axum State 传递
#[derive(Clone)]
pub struct AppState {
    /// 连接池（健康检查直接使用）
    pub pool: DbPool,

    /// 计数记录API
    pub count_record_api: Arc<CountRecordApi>,

    /// 企业/机台API
    pub directory_api: Arc<DirectoryApi>,

    /// 账号API
    pub auth_api: Arc<AuthApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开连接池 -> 建表 -> 组装仓储与API
    pub async fn new(config: &AppConfig) -> RepositoryResult<Self> {
        tracing::info!(
            db_path = %config.db_path,
            pool_size = config.pool_size,
            "初始化AppState"
        );

        let pool = DbPool::open(&config.db_path, config.pool_size)?;
        pool.ensure_schema().await?;

        let count_store: Arc<dyn CountRecordStore> =
            Arc::new(CountRecordRepository::new(pool.clone()));
        let business_repo = Arc::new(BusinessRepository::new(pool.clone()));
        let station_repo = Arc::new(StationRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone()));

        let tokens = TokenService::new(config.jwt_secret.clone(), config.token_ttl_secs);

        let state = Self {
            pool,
            count_record_api: Arc::new(CountRecordApi::new(count_store)),
            directory_api: Arc::new(DirectoryApi::new(business_repo, station_repo)),
            auth_api: Arc::new(AuthApi::new(user_repo, tokens, config.bcrypt_cost)),
        };

        tracing::info!("AppState初始化完成");
        Ok(state)
    }
}
