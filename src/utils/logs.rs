use log::LevelFilter;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl From<LevelFilter> for LogLevel {
    fn from(level: LevelFilter) -> Self {
        match level {
            LevelFilter::Error => LogLevel::Error,
            LevelFilter::Warn => LogLevel::Warn,
            LevelFilter::Info => LogLevel::Info,
            LevelFilter::Debug => LogLevel::Debug,
            LevelFilter::Trace => LogLevel::Trace,
            LevelFilter::Off => LogLevel::Off,
        }
    }
}

/// 解析日志级别名称（大小写不敏感）
pub fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        other => Err(format!("无效的日志级别: {}", other)),
    }
}

/// 初始化日志输出
///
/// `log` 宏的记录经由 tracing-subscriber 输出；设置了 `RUST_LOG` 时以其为准，
/// 否则使用配置中的级别。sqlx 的语句日志压到 warn。
pub fn init_logging(level: &str) -> LogLevel {
    let level = parse_log_level(level).unwrap_or_else(|e| {
        eprintln!("{}，回退到 info", e);
        LevelFilter::Info
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},sqlx=warn,sea_orm=warn",
            level.to_string().to_lowercase()
        ))
    });

    if fmt().with_env_filter(filter).try_init().is_err() {
        log::debug!("日志已初始化，跳过");
    }

    level.into()
}
