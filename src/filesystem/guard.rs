// 路径安全守卫
//
// 将客户端传入的相对路径解析到根目录之下，防止路径穿越攻击

use std::path::{Component, Path, PathBuf};

use super::probe::map_io_error;
use super::types::{FilesystemConfig, FsError, FsErrorKind};

/// 路径安全守卫
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
    /// 严格模式下的真实根目录（已解析符号链接）
    canonical_root: Option<PathBuf>,
}

impl PathGuard {
    /// 创建新的路径守卫
    ///
    /// `config.root_dir` 应当已经过 [`FilesystemConfig::validate`] 处理
    pub fn new(config: &FilesystemConfig) -> Self {
        let canonical_root = config
            .resolve_symlinks
            .then(|| {
                dunce::canonicalize(&config.root_dir).unwrap_or_else(|e| {
                    tracing::warn!(
                        "无法解析根目录真实路径: {:?}, 错误: {}，使用原路径",
                        config.root_dir,
                        e
                    );
                    config.root_dir.clone()
                })
            });

        Self {
            root: config.root_dir.clone(),
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 解析相对路径（纯词法操作，不访问文件系统）
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, FsError> {
        resolve(&self.root, requested).map_err(|e| {
            tracing::warn!("拒绝越界路径访问: {:?}", requested);
            e
        })
    }

    /// 严格模式：解析符号链接后再次检查是否仍在根目录内
    ///
    /// 非严格模式下原样返回，不做任何 I/O
    pub fn confine(&self, resolved: &Path) -> Result<PathBuf, FsError> {
        let Some(canonical_root) = &self.canonical_root else {
            return Ok(resolved.to_path_buf());
        };

        let real = dunce::canonicalize(resolved).map_err(|e| map_io_error(&e, resolved))?;
        if !real.starts_with(canonical_root) {
            tracing::warn!("符号链接指向根目录之外: {:?} -> {:?}", resolved, real);
            return Err(FsError::new(FsErrorKind::PathEscapesRoot));
        }
        Ok(real)
    }

    /// 获取已解析路径相对于根目录的表示（以 `/` 分隔，根目录为空字符串）
    pub fn relative_of(&self, resolved: &Path) -> String {
        resolved
            .strip_prefix(&self.root)
            .map(|rel| {
                rel.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }
}

/// 将请求路径解析到根目录之下
///
/// - 空串、`.`、`/` 直接返回根目录
/// - 前导 `/` 视为根目录下的后缀，不会替换根目录
/// - `..` 逐级回退，结果必须等于根目录或以根目录为前缀（按路径组件比较）
pub fn resolve(root: &Path, requested: &str) -> Result<PathBuf, FsError> {
    if requested.is_empty() || requested == "." || requested == "/" {
        return Ok(root.to_path_buf());
    }

    let mut resolved = root.to_path_buf();
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if !resolved.starts_with(root) {
        return Err(FsError::new(FsErrorKind::PathEscapesRoot).with_path(requested));
    }

    Ok(resolved)
}

/// 拼接相对路径
pub(crate) fn join_relative(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}
