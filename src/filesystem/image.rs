// 图片服务
//
// 列出目录中的图片文件，并把图片相对路径解析为可安全读取的绝对路径

use std::path::{Path, PathBuf};

use super::classifier::{extension_of, ImageClassifier};
use super::guard::{join_relative, PathGuard};
use super::probe::{assert_is_directory, assert_is_file, map_io_error};
use super::types::*;

/// 图片服务
#[derive(Debug, Clone)]
pub struct ImageService {
    guard: PathGuard,
    classifier: ImageClassifier,
}

impl ImageService {
    /// 创建新的图片服务
    pub fn new(config: &FilesystemConfig) -> Self {
        Self {
            guard: PathGuard::new(config),
            classifier: ImageClassifier::new(&config.allowed_extensions),
        }
    }

    /// 列出目录中的图片文件，按名称排序
    ///
    /// 没有图片的目录返回空列表
    pub async fn list_images(&self, relative_path: &str) -> Result<Vec<ImageFile>, FsError> {
        let resolved = self.guard.resolve(relative_path)?;
        let real = self.guard.confine(&resolved).map_err(|e| e.with_path(relative_path))?;
        assert_is_directory(&real)
            .await
            .map_err(|e| e.with_path(relative_path))?;

        let base = self.guard.relative_of(&resolved);
        let mut images = self
            .read_images(&real, &base)
            .await
            .map_err(|e| e.with_path(relative_path))?;

        images.sort_by(|a, b| compare_names(&a.name, &b.name));

        tracing::debug!("列出图片: {:?}, 图片数={}", relative_path, images.len());
        Ok(images)
    }

    /// 解析图片路径
    ///
    /// 只做校验并返回绝对路径，不打开文件
    pub async fn resolve_image_path(&self, relative_path: &str) -> Result<PathBuf, FsError> {
        let resolved = self.guard.resolve(relative_path)?;
        let real = self.guard.confine(&resolved).map_err(|e| e.with_path(relative_path))?;
        assert_is_file(&real)
            .await
            .map_err(|e| e.with_path(relative_path))?;

        let file_name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.classifier.is_supported_image(&file_name) {
            return Err(FsError::new(FsErrorKind::UnsupportedType).with_path(relative_path));
        }

        Ok(real)
    }

    async fn read_images(&self, dir: &Path, base: &str) -> Result<Vec<ImageFile>, FsError> {
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| map_io_error(&e, dir))?;

        let mut images = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| map_io_error(&e, dir))?
        {
            let entry_path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| map_io_error(&e, &entry_path))?;
            if !file_type.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.classifier.is_supported_image(&name) {
                continue;
            }
            let Some(extension) = extension_of(&name) else {
                continue;
            };

            // 每次重新 stat，保证大小是当前磁盘上的值
            let metadata = tokio::fs::metadata(&entry_path)
                .await
                .map_err(|e| map_io_error(&e, &entry_path))?;

            images.push(ImageFile {
                path: join_relative(base, &name),
                name,
                size: metadata.len(),
                extension,
            });
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// 测试目录结构：
    /// root/
    ///   art/photo.jpg, art/b.PNG, art/A.gif, art/notes.txt, art/.gitkeep, art/fake.png/
    ///   docs/
    fn setup() -> (TempDir, ImageService) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let art = root.join("art");
        fs::create_dir(&art).unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(art.join("photo.jpg"), b"0123456789").unwrap();
        fs::write(art.join("b.PNG"), b"png").unwrap();
        fs::write(art.join("A.gif"), b"").unwrap();
        fs::write(art.join("notes.txt"), b"notes").unwrap();
        fs::write(art.join(".gitkeep"), b"").unwrap();
        fs::create_dir(art.join("fake.png")).unwrap();

        let service = ImageService::new(&FilesystemConfig::new(root));
        (temp_dir, service)
    }

    #[tokio::test]
    async fn test_list_images() {
        let (_temp, service) = setup();

        let images = service.list_images("art").await.unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A.gif", "b.PNG", "photo.jpg"]);

        let photo = &images[2];
        assert_eq!(photo.path, "art/photo.jpg");
        assert_eq!(photo.extension, ".jpg");
        assert_eq!(photo.size, 10);
        assert_eq!(images[1].extension, ".png");
        assert_eq!(images[0].size, 0);
    }

    #[tokio::test]
    async fn test_directory_without_images_is_empty() {
        let (_temp, service) = setup();
        assert!(service.list_images("docs").await.unwrap().is_empty());
        assert!(service.list_images("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_size_reflects_current_file() {
        let (temp, service) = setup();
        fs::write(temp.path().join("art").join("photo.jpg"), b"01234567890123456789").unwrap();

        let images = service.list_images("art").await.unwrap();
        assert_eq!(images[2].size, 20);
    }

    #[tokio::test]
    async fn test_list_images_errors() {
        let (_temp, service) = setup();

        let err = service.list_images("../etc").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::PathEscapesRoot);

        let err = service.list_images("missing").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);

        let err = service.list_images("art/photo.jpg").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_custom_extensions() {
        let (temp, _) = setup();
        let config = FilesystemConfig {
            allowed_extensions: vec![".txt".to_string()],
            ..FilesystemConfig::new(temp.path())
        };
        let service = ImageService::new(&config);

        let images = service.list_images("art").await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "notes.txt");
    }

    #[tokio::test]
    async fn test_resolve_image_path() {
        let (temp, service) = setup();

        let path = service.resolve_image_path("art/photo.jpg").await.unwrap();
        assert_eq!(path, temp.path().join("art").join("photo.jpg"));
    }

    #[tokio::test]
    async fn test_resolve_image_path_errors() {
        let (_temp, service) = setup();

        let err = service.resolve_image_path("art/notes.txt").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::UnsupportedType);

        let err = service.resolve_image_path("art/nonexistent.jpg").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotFound);

        let err = service.resolve_image_path("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::PathEscapesRoot);

        // 目录即使带图片扩展名也不是文件
        let err = service.resolve_image_path("art/fake.png").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotAFile);

        let err = service.resolve_image_path("").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::NotAFile);
    }

    #[tokio::test]
    async fn test_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("art")).unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("art").join("photo.jpg"), b"jpeg-bytes").unwrap();
        fs::write(root.join("art").join("notes.txt"), b"text").unwrap();

        let config = FilesystemConfig::new(root);
        let directories = crate::filesystem::DirectoryService::new(&config);
        let images = ImageService::new(&config);

        let dirs = directories.list_directories("").await.unwrap();
        let dir_names: Vec<&str> = dirs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(dir_names, vec!["art", "docs"]);

        let listed = images.list_images("art").await.unwrap();
        assert_eq!(
            listed,
            vec![ImageFile {
                name: "photo.jpg".to_string(),
                path: "art/photo.jpg".to_string(),
                size: 10,
                extension: ".jpg".to_string(),
            }]
        );

        let err = images.resolve_image_path("art/notes.txt").await.unwrap_err();
        assert_eq!(err.kind, FsErrorKind::UnsupportedType);
    }
}
