///! Logging initialization
///! Console output plus optional rolling JSON files

use crate::config::LoggingConfig;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(config: &LoggingConfig, file_prefix: &str) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let console_layer = if config.json {
        fmt::layer()
            .with_target(true)
            .with_writer(io::stdout)
            .json()
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .with_writer(io::stdout)
            .boxed()
    };

    let guard = if let Some(ref dir) = config.log_dir {
        let file_appender = rolling::daily(dir, format!("{}.log", file_prefix));
        let (non_blocking, guard) = non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .json()
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()?;

        None
    };

    tracing::info!("Logging initialized - level: {}", config.level);

    Ok(guard)
}

/// Log ledger operation
#[macro_export]
macro_rules! log_db_operation {
    ($op:expr, $table:expr) => {
        tracing::debug!(
            operation = $op,
            table = $table,
            "Database operation"
        )
    };
    ($op:expr, $table:expr, $id:expr) => {
        tracing::debug!(
            operation = $op,
            table = $table,
            record_id = $id,
            "Database operation"
        )
    };
}
