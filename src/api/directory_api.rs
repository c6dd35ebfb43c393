// ==========================================
// 生产计数服务 - 企业/机台目录 API
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::directory::{Business, Station};
use crate::repository::error::RepositoryError;
use crate::repository::{BusinessRepository, StationRepository};

fn required_name(name: Option<&str>, message: &str) -> ApiResult<String> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n.to_string()),
        _ => Err(ApiError::InvalidInput(message.to_string())),
    }
}

/// 目录 API（企业 + 机台）
pub struct DirectoryApi {
    business_repo: Arc<BusinessRepository>,
    station_repo: Arc<StationRepository>,
}

impl DirectoryApi {
    pub fn new(
        business_repo: Arc<BusinessRepository>,
        station_repo: Arc<StationRepository>,
    ) -> Self {
        Self {
            business_repo,
            station_repo,
        }
    }

    // ==========================================
    // 企业
    // ==========================================

    pub async fn list_businesses(&self) -> ApiResult<Vec<Business>> {
        Ok(self.business_repo.list().await?)
    }

    pub async fn create_business(&self, name: Option<&str>) -> ApiResult<Business> {
        let name = required_name(name, "Business name is required")?;
        Ok(self.business_repo.create(&name).await?)
    }

    pub async fn rename_business(&self, business_id: i64, name: Option<&str>) -> ApiResult<()> {
        let name = required_name(name, "Business name is required")?;
        self.business_repo
            .rename(business_id, &name)
            .await
            .map_err(|e| not_found_as(e, "Business not found"))
    }

    pub async fn delete_business(&self, business_id: i64) -> ApiResult<()> {
        self.business_repo
            .delete(business_id)
            .await
            .map_err(|e| not_found_as(e, "Business not found"))
    }

    // ==========================================
    // 机台
    // ==========================================

    pub async fn list_stations(&self, business_id: Option<i64>) -> ApiResult<Vec<Station>> {
        Ok(self.station_repo.list(business_id).await?)
    }

    /// 新建机台, 返回 Machine_ID
    pub async fn create_station(
        &self,
        name: Option<&str>,
        business_id: Option<i64>,
    ) -> ApiResult<i64> {
        let (name, business_id) = match (required_name(name, ""), business_id) {
            (Ok(name), Some(bid)) => (name, bid),
            _ => {
                return Err(ApiError::InvalidInput(
                    "Both Machine name and Business ID are required".to_string(),
                ))
            }
        };

        match self.station_repo.create(&name, business_id).await {
            Ok(machine_id) => Ok(machine_id),
            Err(RepositoryError::ForeignKeyViolation(_)) => {
                Err(ApiError::InvalidInput("Invalid Business ID".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn rename_station(&self, machine_id: i64, name: Option<&str>) -> ApiResult<()> {
        let name = required_name(name, "Machine name is required")?;
        self.station_repo
            .rename(machine_id, &name)
            .await
            .map_err(|e| not_found_as(e, "Station not found"))
    }

    pub async fn delete_station(&self, machine_id: i64) -> ApiResult<()> {
        self.station_repo
            .delete(machine_id)
            .await
            .map_err(|e| not_found_as(e, "Station not found"))
    }
}

/// NotFound 改写为固定文案, 其余按默认规则转换
fn not_found_as(err: RepositoryError, message: &str) -> ApiError {
    match err {
        RepositoryError::NotFound { .. } => ApiError::NotFound(message.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use tempfile::NamedTempFile;

    async fn setup_api() -> (DirectoryApi, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let pool = DbPool::open(temp.path().to_str().unwrap(), 2).unwrap();
        pool.ensure_schema().await.unwrap();
        let api = DirectoryApi::new(
            Arc::new(BusinessRepository::new(pool.clone())),
            Arc::new(StationRepository::new(pool)),
        );
        (api, temp)
    }

    #[tokio::test]
    async fn test_business_lifecycle() {
        let (api, _temp) = setup_api().await;

        let err = api.create_business(Some("   ")).await.unwrap_err();
        assert_eq!(err.public_message(), "Business name is required");

        let created = api.create_business(Some("Alpha")).await.unwrap();
        assert_eq!(created.business_id, 1);

        api.rename_business(1, Some("Alpha Prime")).await.unwrap();
        let err = api.rename_business(9, Some("x")).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.public_message(), "Business not found");

        api.delete_business(1).await.unwrap();
        assert!(api.list_businesses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_station_create_rules() {
        let (api, _temp) = setup_api().await;
        api.create_business(Some("Alpha")).await.unwrap();

        let err = api.create_station(Some("Reflow"), None).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = api.create_station(Some("Reflow"), Some(5)).await.unwrap_err();
        assert_eq!(err.public_message(), "Invalid Business ID");

        assert_eq!(api.create_station(Some("Reflow"), Some(1)).await.unwrap(), 1);
        assert_eq!(api.list_stations(Some(1)).await.unwrap().len(), 1);

        let err = api.delete_station(2).await.unwrap_err();
        assert_eq!(err.public_message(), "Station not found");
    }
}
