// 应用状态

use crate::config::AppConfig;
use crate::filesystem::{DirectoryService, ImageService};
use std::sync::Arc;

/// 应用全局状态
///
/// 所有字段在启动后只读，请求之间无需加锁
#[derive(Clone)]
pub struct AppState {
    /// 目录列表服务
    pub directory_service: Arc<DirectoryService>,
    /// 图片服务
    pub image_service: Arc<ImageService>,
    /// 应用配置
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 根据已校验的配置创建应用状态
    pub fn new(config: AppConfig) -> Self {
        Self {
            directory_service: Arc::new(DirectoryService::new(&config.filesystem)),
            image_service: Arc::new(ImageService::new(&config.filesystem)),
            config: Arc::new(config),
        }
    }
}
