// 文件系统探测
//
// 每次调用都重新 stat，不缓存结果

use std::io;
use std::path::Path;

use super::types::{FsError, FsErrorKind};

/// 确认路径存在且为目录
pub async fn assert_is_directory(path: &Path) -> Result<(), FsError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| map_io_error(&e, path))?;

    if !metadata.is_dir() {
        return Err(FsError::new(FsErrorKind::NotADirectory));
    }
    Ok(())
}

/// 确认路径存在且为普通文件
pub async fn assert_is_file(path: &Path) -> Result<(), FsError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| map_io_error(&e, path))?;

    if !metadata.is_file() {
        return Err(FsError::new(FsErrorKind::NotAFile));
    }
    Ok(())
}

/// 将 I/O 错误映射为文件系统错误
///
/// 路径不存在（包括中间某级不是目录）映射为 NotFound，其余为 Internal
pub(crate) fn map_io_error(err: &io::Error, path: &Path) -> FsError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => FsError::new(FsErrorKind::NotFound),
        _ => {
            tracing::error!("访问路径失败: {:?}, 错误: {}", path, err);
            FsError::internal(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_assert_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.txt");
        fs::write(&file_path, "test").unwrap();

        assert!(assert_is_directory(temp_dir.path()).await.is_ok());

        let err = assert_is_directory(&file_path).await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotADirectory);

        let err = assert_is_directory(&temp_dir.path().join("missing")).await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_assert_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.txt");
        fs::write(&file_path, "test").unwrap();

        assert!(assert_is_file(&file_path).await.is_ok());

        let err = assert_is_file(temp_dir.path()).await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotAFile);

        let err = assert_is_file(&temp_dir.path().join("missing.jpg")).await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_file_used_as_directory_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.txt");
        fs::write(&file_path, "test").unwrap();

        let err = assert_is_file(&file_path.join("nested.jpg")).await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);
    }

    #[test]
    fn test_map_io_error_kinds() {
        let path = Path::new("/data/a.jpg");

        let err = map_io_error(&io::Error::from(io::ErrorKind::NotFound), path);
        assert_eq!(err.kind, FsErrorKind::NotFound);

        let err = map_io_error(&io::Error::from(io::ErrorKind::NotADirectory), path);
        assert_eq!(err.kind, FsErrorKind::NotFound);

        let err = map_io_error(&io::Error::from(io::ErrorKind::PermissionDenied), path);
        assert_eq!(err.kind, FsErrorKind::Internal);
        assert_eq!(err.kind.code(), 40099);

        let err = map_io_error(&io::Error::new(io::ErrorKind::Other, "disk failure"), path);
        assert_eq!(err.kind, FsErrorKind::Internal);
        assert!(err.message.contains("disk failure"));
    }

    #[tokio::test]
    async fn test_probe_sees_fresh_state() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("later");

        assert!(assert_is_directory(&dir).await.is_err());
        fs::create_dir(&dir).unwrap();
        assert!(assert_is_directory(&dir).await.is_ok());
    }
}
