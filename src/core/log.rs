//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//!
//! 资源系统内部统一使用 `dist_resource::resource` 目标输出日志，
//! 驱动程序和示例使用 `dist_resource::app` 目标，便于通过 `EnvFilter` 单独过滤。
//!
//! # 使用示例
//!
//! ```no_run
//! use dist_resource::core::{config::LogLevel, log};
//!
//! log::init_logger(LogLevel::Info, false, None);
//!
//! dist_resource::app_info!("Application started");
//! dist_resource::resource_warn!(slot = 3, "Resource no longer exists");
//! ```

use std::path::Path;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use super::config::LogLevel;

const DEFAULT_LOG_FILE: &str = "dist_resource.log";

/// 初始化日志系统
///
/// 必须在程序开始时调用一次。重复调用时后续调用被忽略。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "dist_resource.log"）
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) {
    let filter = EnvFilter::new(level.filter_directive());

    if file_output {
        let log_path = log_file_path.unwrap_or(DEFAULT_LOG_FILE);
        let path = Path::new(log_path);
        let directory = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);

        // 每天滚动
        let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(false)
            .with_writer(file_appender);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    }
}

/// 初始化简单的日志系统（仅控制台输出，Info 级别）
pub fn init_simple() {
    init_logger(LogLevel::Info, false, None);
}

impl LogLevel {
    fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 资源系统日志 - Debug 级别
#[macro_export]
macro_rules! resource_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "dist_resource::resource", $($arg)*)
    };
}

/// 资源系统日志 - Info 级别
#[macro_export]
macro_rules! resource_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dist_resource::resource", $($arg)*)
    };
}

/// 资源系统日志 - Warn 级别
#[macro_export]
macro_rules! resource_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "dist_resource::resource", $($arg)*)
    };
}

/// 资源系统日志 - Error 级别
#[macro_export]
macro_rules! resource_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "dist_resource::resource", $($arg)*)
    };
}

/// 应用层日志 - Info 级别
#[macro_export]
macro_rules! app_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dist_resource::app", $($arg)*)
    };
}

/// 应用层日志 - Warn 级别
#[macro_export]
macro_rules! app_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "dist_resource::app", $($arg)*)
    };
}

/// 应用层日志 - Error 级别
#[macro_export]
macro_rules! app_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "dist_resource::app", $($arg)*)
    };
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 性能追踪宏
///
/// 创建一个 TRACE 级别的 span，进入后在离开作用域时记录耗时。
///
/// # 示例
///
/// ```ignore
/// let _guard = span_trace!("garbage_collect").entered();
/// ```
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::span!(tracing::Level::TRACE, $name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(LogLevel::Warn.filter_directive(), "warn");
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_simple();
        init_logger(LogLevel::Debug, false, None);
    }
}
