//! Logging configuration for the wellbeing service

use std::ffi::OsStr;
use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "wellbeing.log";

/// Initialize logging from configuration, honouring `RUST_LOG` when no config is given
pub fn init_logging_with_config(config: Option<&crate::config::AppConfig>) -> Result<()> {
    let env_filter = match config {
        Some(config) => filter_for(&config.logging.level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,wellbeing=debug")),
    };
    let level = config.map_or("info", |c| c.logging.level.as_str());
    install(env_filter, level)
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<()> {
    install(filter_for(level), level)
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},wellbeing={level}"))
}

fn install(env_filter: EnvFilter, level: &str) -> Result<()> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::WellbeingError::Custom(format!("Logging already initialized: {e}")))?;

    tracing::info!("Logging initialized with level: {}", level);
    tracing::info!("Log files will be saved to: {}/{}.YYYY-MM-DD", LOG_DIR, LOG_FILE);

    // The writer thread must outlive main
    std::mem::forget(guard);

    Ok(())
}

/// Value to export as `RUST_BACKTRACE`, if any: only when backtraces are
/// enabled in config and the variable is not already set.
fn backtrace_override(config: &LoggingConfig, current: Option<&OsStr>) -> Option<&'static str> {
    (config.backtrace && current.is_none()).then_some("1")
}

/// Export `RUST_BACKTRACE=1` when `logging.backtrace` is enabled.
///
/// Call before spawning threads; an explicit `RUST_BACKTRACE` always wins.
pub fn apply_backtrace_setting(config: &LoggingConfig) {
    let current = std::env::var_os("RUST_BACKTRACE");
    if let Some(value) = backtrace_override(config, current.as_deref()) {
        std::env::set_var("RUST_BACKTRACE", value);
    }
}

/// Initialize simple console-only logging, for tests and one-shot commands
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| crate::WellbeingError::Custom(format!("Logging already initialized: {e}")))?;
    Ok(())
}
