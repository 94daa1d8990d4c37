// Image Browser Library
// 本地图片浏览器后端核心库

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// 沙箱文件系统模块
pub mod filesystem;

// Web服务器模块
pub mod server;

// 导出常用类型
pub use config::{AppConfig, ConfigError, FilesystemConfig};
pub use filesystem::{
    DirectoryEntry, DirectoryService, FsError, FsErrorKind, ImageClassifier, ImageFile,
    ImageService, PathGuard,
};
pub use server::{build_router, AppState};
