// 配置管理模块

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

use crate::filesystem::{normalize_extension, DEFAULT_IMAGE_EXTENSIONS};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "IMAGE_BROWSER_CONFIG";

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("未配置根目录，请设置 ROOT_DIRECTORY 环境变量或 filesystem.root_dir")]
    MissingRootDirectory,

    #[error("根目录不存在: {0:?}")]
    RootDirectoryNotFound(PathBuf),

    #[error("根目录不是目录: {0:?}")]
    RootNotADirectory(PathBuf),

    #[error("无法访问根目录 {path:?}: {source}")]
    RootDirectoryInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("无效的端口: {0}，必须在 1 到 65535 之间")]
    InvalidPort(String),

    #[error("没有配置任何允许的图片扩展名")]
    NoAllowedExtensions,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 文件系统配置
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS允许的源（为空表示允许所有）
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// 前端构建产物目录（为空时自动检测）
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8765
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            frontend_dir: None,
        }
    }
}

/// 文件系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// 根目录，所有访问都限制在该目录内
    #[serde(default)]
    pub root_dir: PathBuf,
    /// 允许的图片扩展名（小写，带前导点）
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// 是否解析符号链接后再检查根目录范围
    #[serde(default)]
    pub resolve_symlinks: bool,
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::new(),
            allowed_extensions: default_allowed_extensions(),
            resolve_symlinks: false,
        }
    }
}

impl FilesystemConfig {
    /// 以指定根目录创建配置，其余使用默认值
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    /// 校验并规范化配置
    ///
    /// 根目录必须存在且为目录，校验通过后替换为规范化的绝对路径；
    /// 扩展名统一为小写并带前导点
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRootDirectory);
        }

        let root = if self.root_dir.is_absolute() {
            self.root_dir.clone()
        } else {
            std::env::current_dir()
                .map_err(|source| ConfigError::RootDirectoryInaccessible {
                    path: self.root_dir.clone(),
                    source,
                })?
                .join(&self.root_dir)
        };

        match std::fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(ConfigError::RootNotADirectory(root)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::RootDirectoryNotFound(root))
            }
            Err(source) => return Err(ConfigError::RootDirectoryInaccessible { path: root, source }),
        }

        self.root_dir = dunce::canonicalize(&root)
            .map_err(|source| ConfigError::RootDirectoryInaccessible { path: root, source })?;

        let extensions: BTreeSet<String> = self
            .allowed_extensions
            .iter()
            .filter_map(|ext| normalize_extension(ext))
            .collect();
        if extensions.is_empty() {
            return Err(ConfigError::NoAllowedExtensions);
        }
        self.allowed_extensions = extensions.into_iter().collect();

        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default)]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 获取配置文件路径（可通过环境变量覆盖）
    pub fn config_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载配置，文件不存在或无法解析时使用默认配置
    pub async fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {:#}", e);
                Self::default()
            }
        }
    }

    /// 加载配置、应用环境变量覆盖并校验
    pub async fn load(path: &str) -> Result<Self> {
        let mut config = Self::load_or_default(path).await;
        config
            .apply_env_overrides()
            .context("环境变量配置无效")?;
        config.validate().context("配置校验失败")?;
        Ok(config)
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数应用覆盖项
    ///
    /// 支持 ROOT_DIRECTORY / ROOT_DIR、HOST、PORT、LOG_LEVEL、ALLOWED_IMAGE_EXTENSIONS
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(root) = lookup("ROOT_DIRECTORY").or_else(|| lookup("ROOT_DIR")) {
            self.filesystem.root_dir = PathBuf::from(root);
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(port))?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }

        if let Some(extensions) = lookup("ALLOWED_IMAGE_EXTENSIONS") {
            self.filesystem.allowed_extensions =
                extensions.split(',').map(|ext| ext.trim().to_string()).collect();
        }

        Ok(())
    }

    /// 校验整个配置
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }
        self.filesystem.validate()
    }
}
