// 系统 API 处理器

use axum::{http::StatusCode, http::Uri, response::IntoResponse, Json};
use serde::Serialize;

use super::filesystem::ErrorResponse;

/// 健康检查响应结构
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}

/// 未匹配的路由
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            code: StatusCode::NOT_FOUND.as_u16() as i32,
            message: format!("路由不存在: {}", uri.path()),
            path: None,
        }),
    )
}
