//! 运行配置
//!
//! 全部来自环境变量，非法值回退到默认值并打印警告。
//! `.env` 由启动流程在初始化日志之前加载。

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

/// 默认 SQLite 数据库文件位置（相对工作目录）
pub const DEFAULT_DB_FILE: &str = "data/chuck_jokes.db";
pub const DEFAULT_JOKE_API_BASE_URL: &str = "https://api.chucknorris.io/";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// 为空时使用 [`DEFAULT_DB_FILE`]
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub joke_api_base_url: String,
    pub joke_api_timeout: Duration,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            db_max_connections: 5,
            joke_api_base_url: DEFAULT_JOKE_API_BASE_URL.to_string(),
            joke_api_timeout: Duration::from_secs(30),
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_secure: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: var("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            db_max_connections: try_load("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            joke_api_base_url: var("JOKE_API_BASE_URL").unwrap_or(defaults.joke_api_base_url),
            joke_api_timeout: Duration::from_secs(try_load(
                "JOKE_API_TIMEOUT_SECS",
                defaults.joke_api_timeout.as_secs(),
            )),
            session_ttl: session_ttl_from_hours(try_load(
                "SESSION_TTL_HOURS",
                defaults.session_ttl.as_secs() / 3600,
            )),
            cookie_secure: parse_bool(var("COOKIE_SECURE").as_deref())
                .unwrap_or(defaults.cookie_secure),
            log_level: Self::log_level_from_env(),
        }
    }

    /// 日志级别需要在完整加载配置之前读取
    pub fn log_level_from_env() -> String {
        var("LOG_LEVEL").unwrap_or_else(|| Self::default().log_level)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("{key} 取值无效 ({raw}): {e}，使用默认值 {default}");
            default
        }),
    }
}

/// 会话有效期上限，过期时间需要放进 i64 秒
const MAX_SESSION_TTL_HOURS: u64 = 100 * 365 * 24;

fn session_ttl_from_hours(hours: u64) -> Duration {
    let clamped = hours.min(MAX_SESSION_TTL_HOURS);
    if clamped != hours {
        warn!("SESSION_TTL_HOURS 过大 ({hours})，按 {clamped} 小时处理");
    }
    Duration::from_secs(clamped.saturating_mul(3600))
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw?.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
