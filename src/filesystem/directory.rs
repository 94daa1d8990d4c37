// 目录列表服务
//
// 只列出直接子目录，子节点按需加载

use std::path::Path;

use super::guard::{join_relative, PathGuard};
use super::probe::{assert_is_directory, map_io_error};
use super::types::*;

/// 目录列表服务
#[derive(Debug, Clone)]
pub struct DirectoryService {
    guard: PathGuard,
}

impl DirectoryService {
    /// 创建新的目录服务
    pub fn new(config: &FilesystemConfig) -> Self {
        Self {
            guard: PathGuard::new(config),
        }
    }

    /// 列出指定路径下的直接子目录（不包含文件），按名称排序
    pub async fn list_directories(&self, relative_path: &str) -> Result<Vec<DirectoryEntry>, FsError> {
        let resolved = self.guard.resolve(relative_path)?;
        let real = self.guard.confine(&resolved).map_err(|e| e.with_path(relative_path))?;
        assert_is_directory(&real)
            .await
            .map_err(|e| e.with_path(relative_path))?;

        let base = self.guard.relative_of(&resolved);
        let mut directories = read_subdirectories(&real, &base)
            .await
            .map_err(|e| e.with_path(relative_path))?;

        directories.sort_by(|a, b| compare_names(&a.name, &b.name));

        tracing::debug!("列出目录: {:?}, 子目录数={}", relative_path, directories.len());
        Ok(directories)
    }

    /// 获取目录本身及其直接子目录（用于目录树展开）
    pub async fn get_directory_with_children(
        &self,
        relative_path: &str,
    ) -> Result<DirectoryEntry, FsError> {
        let resolved = self.guard.resolve(relative_path)?;
        let children = self.list_directories(relative_path).await?;

        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        Ok(DirectoryEntry {
            children: Some(children),
            ..DirectoryEntry::new(name, self.guard.relative_of(&resolved))
        })
    }

    /// 检查目录是否存在，任何错误都视为不存在
    pub async fn directory_exists(&self, relative_path: &str) -> bool {
        let Ok(resolved) = self.guard.resolve(relative_path) else {
            return false;
        };
        let Ok(real) = self.guard.confine(&resolved) else {
            return false;
        };
        assert_is_directory(&real).await.is_ok()
    }
}

/// 读取目录下的子目录条目（不跟随符号链接判断类型）
async fn read_subdirectories(dir: &Path, base: &str) -> Result<Vec<DirectoryEntry>, FsError> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| map_io_error(&e, dir))?;

    let mut directories = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| map_io_error(&e, dir))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| map_io_error(&e, &entry.path()))?;
        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = join_relative(base, &name);
        directories.push(DirectoryEntry::new(name, path));
    }

    Ok(directories)
}
