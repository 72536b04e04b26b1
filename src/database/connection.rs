use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::{Config, DEFAULT_DB_FILE};

/// 内存数据库（测试用），只能使用单连接，否则每个连接都是一份新库
pub const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// 解析最终使用的数据库连接字符串
///
/// 未配置 `DATABASE_URL` 时使用工作目录下的默认 SQLite 文件
pub fn resolve_database_url(config: &Config) -> Result<String, DbErr> {
    match &config.database_url {
        Some(url) => Ok(url.clone()),
        None => {
            let db_path = std::env::current_dir()
                .map_err(|e| DbErr::Conn(RuntimeErr::Internal(format!("无法获取工作目录: {}", e))))?
                .join(DEFAULT_DB_FILE);
            ensure_db_dir_exists(&db_path).map_err(|e| DbErr::Conn(RuntimeErr::Internal(e)))?;
            sqlite_url_for_path(&db_path)
        }
    }
}

/// 确保数据库所在目录存在
pub fn ensure_db_dir_exists(db_path: &Path) -> Result<(), String> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("无法创建数据库目录: {}", e))?;
    }
    Ok(())
}

/// 使用 `url` crate 安全地构建 sqlite 连接字符串
pub fn sqlite_url_for_path(db_path: &PathBuf) -> Result<String, DbErr> {
    let db_url = Url::from_file_path(db_path).map_err(|_| {
        DbErr::Conn(RuntimeErr::Internal(format!(
            "Invalid database path: {}",
            db_path.display()
        )))
    })?;

    // mode=rwc：文件不存在时自动创建
    Ok(format!("sqlite:{}?mode=rwc", db_url.path()))
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Establish a SeaORM database connection.
pub async fn establish_connection(
    database_url: &str,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());

    let max_connections = if is_memory_url(database_url) {
        1
    } else {
        max_connections.max(1)
    };

    options
        .max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // 内存库的连接一旦被回收数据就没了
    if is_memory_url(database_url) {
        let forever = Duration::from_secs(u32::MAX as u64);
        options.idle_timeout(forever).max_lifetime(forever);
    }

    log::debug!("数据库连接字符串: {}", options.get_url());

    Database::connect(options).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}
