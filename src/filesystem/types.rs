// 文件系统模块数据类型定义

use serde::Serialize;
use std::cmp::Ordering;

// 重新导出配置模块中的 FilesystemConfig
pub use crate::config::FilesystemConfig;

/// 文件系统错误类型
/// 错误码范围：40001 - 40099
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    /// 路径逃逸出根目录
    PathEscapesRoot = 40001,
    /// 路径不存在
    NotFound = 40002,
    /// 不是目录
    NotADirectory = 40003,
    /// 不是文件
    NotAFile = 40004,
    /// 不是允许的图片类型
    UnsupportedType = 40005,
    /// 内部 I/O 错误
    Internal = 40099,
}

impl FsErrorKind {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::PathEscapesRoot => "路径超出根目录范围，访问被拒绝",
            Self::NotFound => "路径不存在",
            Self::NotADirectory => "指定路径不是目录",
            Self::NotAFile => "指定路径不是文件",
            Self::UnsupportedType => "文件不是允许的图片类型 (not an image)",
            Self::Internal => "读取文件系统失败",
        }
    }
}

/// 文件系统错误
#[derive(Debug)]
pub struct FsError {
    pub kind: FsErrorKind,
    pub message: String,
    /// 客户端请求的相对路径（不包含根目录）
    pub path: Option<String>,
}

impl FsError {
    pub fn new(kind: FsErrorKind) -> Self {
        Self {
            message: kind.message().to_string(),
            kind,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// 把底层 I/O 错误包装为 Internal
    pub fn internal(err: &std::io::Error) -> Self {
        Self::new(FsErrorKind::Internal).with_message(format!("读取文件系统失败: {}", err))
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {}", self.message, path)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for FsError {}

/// 目录条目（目录树节点）
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// 目录名
    pub name: String,
    /// 相对根目录的路径
    pub path: String,
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
    /// 子目录，仅在显式请求时填充（None 表示尚未加载，而不是没有子目录）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryEntry>>,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_directory: true,
            children: None,
        }
    }
}

/// 图片文件
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageFile {
    /// 文件名
    pub name: String,
    /// 相对根目录的路径
    pub path: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 小写扩展名，包含前导点（如 ".jpg"）
    pub extension: String,
}

/// 目录列表响应
#[derive(Debug, Serialize)]
pub struct DirectoryListResponse {
    /// 请求的路径（原样返回）
    pub path: String,
    pub directories: Vec<DirectoryEntry>,
}

/// 图片列表响应
#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    /// 请求的路径（原样返回）
    pub path: String,
    pub images: Vec<ImageFile>,
}

/// 按名称排序：先忽略大小写比较，相同时再按原始名称比较，保证结果稳定
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// 根据扩展名获取响应的 Content-Type
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
