// ==========================================
// 生产计数服务 - 请求体提取器
// ==========================================
// 请求体解析失败统一返回 400 {message}, 与其它错误同一格式
// ==========================================

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;

/// JSON 请求体; 解析失败转为 ApiError::InvalidInput
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!(status = %rejection.status(), "请求体解析失败");
                ApiError::InvalidInput(rejection.body_text())
            })?;
        Ok(ApiJson(value))
    }
}
