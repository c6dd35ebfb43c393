// ==========================================
// 生产计数服务 - HTTP 主入口
// ==========================================
// 启动顺序: 日志 -> 配置 -> AppState（连接池 + 建表）-> 路由 -> 监听
// ==========================================

use anyhow::Context;

use production_count::{build_router, logging, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", production_count::APP_NAME);
    tracing::info!("系统版本: {}", production_count::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env();
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(&config)
        .await
        .context("无法初始化AppState")?;

    let app = build_router(state, &config);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    tracing::info!(%addr, "HTTP 服务已启动");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.context("HTTP 服务异常退出")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("收到退出信号, 服务关闭");
        }
    }

    Ok(())
}
