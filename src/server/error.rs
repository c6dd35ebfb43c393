// ==========================================
// 生产计数服务 - HTTP 错误响应
// ==========================================
// 响应体统一为 {"message": ...}
// 5xx 详细原因只写日志
// ==========================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::error::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "请求处理失败");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "请求被拒绝");
        }

        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_no_data_response() {
        let response = ApiError::NoData.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "No data found");
    }

    #[tokio::test]
    async fn test_database_error_is_generic() {
        let response =
            ApiError::DatabaseError("disk I/O error at /var/db".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");
    }
}
