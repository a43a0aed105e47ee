// ==========================================
// 任务导入服务 - HTTP 主入口
// ==========================================
// 启动顺序: 加载配置 → 初始化日志 → 组装 AppState → 监听端口
// ==========================================

use anyhow::Context;
use task_import::app::AppState;
use task_import::config::AppConfig;
use task_import::{api, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_from_env().context("加载配置失败")?;

    // 初始化日志系统
    logging::init(&config.logging);

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", task_import::APP_NAME, task_import::VERSION);
    tracing::info!("==================================================");

    let bind_addr = config.bind_addr();
    tracing::info!(import_dir = ?config.import_dir(), "正在初始化AppState...");
    let state = AppState::new(config).context("无法初始化AppState")?;
    tracing::info!("AppState初始化成功");

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("无法监听地址 {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "HTTP 服务已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已退出");
    Ok(())
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "无法监听 Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到停止信号，开始优雅退出");
}
