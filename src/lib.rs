pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod joke_api;
pub mod state;
pub mod utils;
pub mod web;

use std::sync::Arc;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;

pub use config::Config;
pub use error::AppError;
pub use joke_api::{ChuckNorrisClient, JokeSource};
pub use state::AppState;
pub use web::build_router;

use database::connection::{close_connection, establish_connection, resolve_database_url};
use utils::logs::init_logging;

pub async fn run() -> anyhow::Result<()> {
    // .env 需要在读取日志级别之前加载
    let dotenv = dotenvy::dotenv();
    let level = init_logging(&Config::log_level_from_env());
    match dotenv {
        Ok(path) => log::info!("已加载环境文件: {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("读取 .env 失败: {}", e),
    }
    log::info!("日志级别: {:?}", level);

    let config = Config::load();

    let database_url = resolve_database_url(&config).context("无法确定数据库位置")?;
    let db = establish_connection(&database_url, config.db_max_connections)
        .await
        .context("数据库连接失败")?;
    log::info!("数据库连接成功");

    Migrator::up(&db, None).await.context("数据库迁移失败")?;
    log::info!("数据库迁移完成");

    let client = ChuckNorrisClient::new(&config.joke_api_base_url, config.joke_api_timeout)
        .context("笑话 API 客户端初始化失败")?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(db.clone(), Arc::new(client), config);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("无法监听 {bind_addr}"))?;
    log::info!("服务已启动: http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务异常退出")?;

    log::info!("正在关闭数据库连接");
    close_connection(db).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("收到 Ctrl+C，开始关闭"),
            Err(e) => {
                log::error!("无法监听 Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                log::info!("收到 SIGTERM，开始关闭");
            }
            Err(e) => {
                log::error!("无法监听 SIGTERM: {}", e);
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
}
