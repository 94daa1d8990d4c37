// 文件系统 API 处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::filesystem::{
    DirectoryEntry, DirectoryListResponse, FsError, FsErrorKind, ImageListResponse,
};
use crate::server::state::AppState;

/// 错误响应
#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FsErrorKind {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            FsErrorKind::PathEscapesRoot => StatusCode::FORBIDDEN,
            FsErrorKind::NotFound => StatusCode::NOT_FOUND,
            FsErrorKind::NotADirectory => StatusCode::BAD_REQUEST,
            FsErrorKind::NotAFile => StatusCode::BAD_REQUEST,
            FsErrorKind::UnsupportedType => StatusCode::BAD_REQUEST,
            FsErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.kind.status_code();

        let body = Json(ErrorResponse {
            code: self.kind.code(),
            message: self.message,
            path: self.path,
        });

        (status, body).into_response()
    }
}

/// GET /api/directories
/// 列出根目录下的子目录
pub async fn list_root_directories(
    State(state): State<AppState>,
) -> Result<Json<DirectoryListResponse>, FsError> {
    list_directories_at(&state, String::new()).await
}

/// GET /api/directories/*path
/// 列出指定目录下的子目录
pub async fn list_directories(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<DirectoryListResponse>, FsError> {
    list_directories_at(&state, path).await
}

async fn list_directories_at(
    state: &AppState,
    path: String,
) -> Result<Json<DirectoryListResponse>, FsError> {
    info!("API: 列出目录: {:?}", path);
    let directories = state.directory_service.list_directories(&path).await?;
    Ok(Json(DirectoryListResponse { path, directories }))
}

/// GET /api/images
/// 列出根目录下的图片
pub async fn list_root_images(
    State(state): State<AppState>,
) -> Result<Json<ImageListResponse>, FsError> {
    list_images_at(&state, String::new()).await
}

/// GET /api/images/*path
/// 列出指定目录下的图片
pub async fn list_images(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ImageListResponse>, FsError> {
    list_images_at(&state, path).await
}

async fn list_images_at(state: &AppState, path: String) -> Result<Json<ImageListResponse>, FsError> {
    info!("API: 列出图片: {:?}", path);
    let images = state.image_service.list_images(&path).await?;
    Ok(Json(ImageListResponse { path, images }))
}

/// GET /api/tree
/// 获取根目录节点及其直接子目录
pub async fn get_root_tree(
    State(state): State<AppState>,
) -> Result<Json<DirectoryEntry>, FsError> {
    let entry = state.directory_service.get_directory_with_children("").await?;
    Ok(Json(entry))
}

/// GET /api/tree/*path
/// 获取目录节点及其直接子目录（目录树懒加载）
pub async fn get_tree(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<DirectoryEntry>, FsError> {
    info!("API: 展开目录节点: {:?}", path);
    let entry = state.directory_service.get_directory_with_children(&path).await?;
    Ok(Json(entry))
}
