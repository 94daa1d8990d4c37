use anyhow::Context;
use std::future::{Future, IntoFuture};
use image_browser::{config::LogConfig, logging, AppConfig, AppState};
use tracing::info;

/// 加载日志配置
///
/// 在日志系统初始化之前单独读取 [log] 段，失败时返回默认配置
async fn load_log_config(config_path: &str) -> LogConfig {
    let mut log_config = LogConfig::default();
    if let Ok(content) = tokio::fs::read_to_string(config_path).await {
        if let Ok(config) = toml::from_str::<toml::Value>(&content) {
            if let Some(log_table) = config.get("log") {
                if let Ok(parsed) = log_table.clone().try_into::<LogConfig>() {
                    log_config = parsed;
                }
            }
        }
    }

    if let Ok(level) = std::env::var("LOG_LEVEL") {
        if !level.trim().is_empty() {
            log_config.level = level;
        }
    }
    log_config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::config_path();

    // 先初始化日志系统（必须保持 _log_guard 存活）
    let log_config = load_log_config(&config_path).await;
    let _log_guard = logging::init_logging(&log_config);

    info!("Image Browser v{} 启动中...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&config_path).await.map_err(|e| {
        tracing::error!("配置加载失败: {:#}", e);
        e
    })?;
    info!("根目录: {:?}", config.filesystem.root_dir);
    info!("允许的图片扩展名: {}", config.filesystem.allowed_extensions.join(", "));
    if config.filesystem.resolve_symlinks {
        info!("已启用符号链接严格检查");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = image_browser::build_router(AppState::new(config));

    info!("服务器启动在: http://{}", addr);
    info!("API 基础路径: http://{}/api", addr);
    info!("健康检查: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听地址 {}", addr))?;

    run_until_shutdown(axum::serve(listener, app), tokio::signal::ctrl_c()).await?;

    info!("应用已安全退出");
    Ok(())
}

/// 运行服务器直到其退出或收到关闭信号
///
/// 服务器自身出错时返回错误，进程以非零状态退出
async fn run_until_shutdown<S, C>(server: S, shutdown: C) -> anyhow::Result<()>
where
    S: IntoFuture<Output = std::io::Result<()>>,
    C: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = server.into_future() => {
            if let Err(e) = &result {
                tracing::error!("服务器错误: {}", e);
            }
            result.context("服务器运行失败")?;
        }
        _ = shutdown => {
            info!("收到 Ctrl+C，开始关闭...");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[tokio::test]
    async fn test_server_error_is_returned() {
        let server = async { Err::<(), _>(io::Error::new(io::ErrorKind::AddrInUse, "busy")) };
        let shutdown = std::future::pending::<io::Result<()>>();

        let err = run_until_shutdown(server, shutdown).await.unwrap_err();
        assert!(format!("{:#}", err).contains("busy"));
    }

    #[tokio::test]
    async fn test_shutdown_signal_is_clean_exit() {
        let server = std::future::pending::<io::Result<()>>();
        let shutdown = async { Ok::<(), io::Error>(()) };

        assert!(run_until_shutdown(server, shutdown).await.is_ok());
    }
}
