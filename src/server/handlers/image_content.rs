// 图片内容 API 处理器

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use std::io;
use std::path::Path as StdPath;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use crate::filesystem::{content_type_for_extension, extension_of, FsError, FsErrorKind};
use crate::server::state::AppState;

/// GET /api/image-content
/// 未指定图片路径
pub async fn get_root_image_content(State(state): State<AppState>) -> Result<Response, FsError> {
    stream_image(&state, String::new()).await
}

/// GET /api/image-content/*path
/// 以流的方式返回图片内容
pub async fn get_image_content(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, FsError> {
    stream_image(&state, path).await
}

async fn stream_image(state: &AppState, path: String) -> Result<Response, FsError> {
    info!("API: 读取图片: {:?}", path);
    let absolute = state.image_service.resolve_image_path(&path).await?;
    open_image(&absolute, &path).await
}

/// 打开已解析的图片并构造流式响应
///
/// 解析之后文件仍可能被删除，此时按 NotFound 处理
async fn open_image(absolute: &StdPath, requested: &str) -> Result<Response, FsError> {
    let file = tokio::fs::File::open(absolute).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            FsError::new(FsErrorKind::NotFound).with_path(requested)
        } else {
            error!("打开图片失败: {:?}, 错误: {}", absolute, e);
            FsError::internal(&e).with_path(requested)
        }
    })?;

    // 按解析后的真实文件名决定类型
    let file_name = absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = extension_of(&file_name)
        .map(|ext| content_type_for_extension(&ext))
        .unwrap_or("application/octet-stream");
    let content_length = file.metadata().await.ok().map(|m| m.len());

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesystemConfig;
    use crate::filesystem::ImageService;
    use axum::http::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_image_removed_after_resolution() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("gone.png"), b"png").unwrap();
        let service = ImageService::new(&FilesystemConfig::new(temp_dir.path()));

        let absolute = service.resolve_image_path("gone.png").await.unwrap();
        fs::remove_file(&absolute).unwrap();

        let err = open_image(&absolute, "gone.png").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);
        assert_eq!(err.path.as_deref(), Some("gone.png"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_content_type_from_resolved_name() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.JPG");
        fs::write(&file, b"jpeg").unwrap();

        let response = open_image(&file, "photo.JPG/x/..").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
    }
}
