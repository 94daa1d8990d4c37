// 路由与中间件

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers;
use super::state::AppState;

/// 构建完整应用路由
pub fn build_router(state: AppState) -> Router {
    let server_config = &state.config.server;
    let cors = build_cors_layer(&server_config.cors_origins);
    let frontend_dir = detect_frontend_dir(server_config.frontend_dir.as_deref());

    // API 路由
    let api_routes = Router::new()
        // 目录树
        .route("/directories", get(handlers::list_root_directories))
        .route("/directories/*path", get(handlers::list_directories))
        .route("/tree", get(handlers::get_root_tree))
        .route("/tree/*path", get(handlers::get_tree))
        // 图片
        .route("/images", get(handlers::list_root_images))
        .route("/images/*path", get(handlers::list_images))
        .route("/image-content", get(handlers::get_root_image_content))
        .route("/image-content/*path", get(handlers::get_image_content))
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .with_state(state);

    // 配置中间件层
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let app = Router::new().nest("/api", api_routes);

    // 静态文件服务（前端资源），找不到时未知路由返回 JSON 404
    let app = match frontend_dir {
        Some(dir) => {
            let index_html = dir.join("index.html");
            app.fallback_service(ServeDir::new(&dir).not_found_service(ServeFile::new(index_html)))
        }
        None => app.fallback(handlers::not_found),
    };

    app.layer(middleware)
}

/// CORS 配置：未配置来源时允许所有
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("忽略无效的 CORS 来源: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// 检测前端资源目录
///
/// 配置了目录时只使用配置值；否则按顺序尝试：
/// 1. ./frontend/dist
/// 2. ../frontend/dist
/// 3. {exe_dir}/frontend/dist
fn detect_frontend_dir(configured: Option<&Path>) -> Option<PathBuf> {
    let candidates = match configured {
        Some(dir) => vec![dir.to_path_buf()],
        None => {
            let mut candidates = vec![
                PathBuf::from("./frontend/dist"),
                PathBuf::from("../frontend/dist"),
            ];
            if let Ok(exe_path) = std::env::current_exe() {
                if let Some(exe_dir) = exe_path.parent() {
                    candidates.push(exe_dir.join("frontend/dist"));
                }
            }
            candidates
        }
    };

    // 必须包含 index.html 才视为有效的前端构建
    let found = candidates
        .into_iter()
        .find(|path| path.is_dir() && path.join("index.html").is_file());

    match &found {
        Some(path) => info!("✓ 找到前端资源目录: {:?}", path),
        None => info!("未找到前端资源目录，仅提供 API 服务"),
    }
    found
}
