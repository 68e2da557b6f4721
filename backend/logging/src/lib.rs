//! Structured logging bootstrap.
//!
//! Wraps `tracing` setup: console output with environment-based level
//! control, plus an optional daily-rolling NDJSON file.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix for rolled log files (`loadstone.log.YYYY-MM-DD`).
const LOG_FILE_PREFIX: &str = "loadstone.log";

/// Options for the global logger.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default level filter when `RUST_LOG` is unset, e.g. `"info"`.
    pub level: String,
    /// Directory for NDJSON log files; console-only when `None`.
    pub dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: None,
        }
    }
}

/// Initialize the global logger. Safe to call more than once; later calls
/// are no-ops.
pub fn init(options: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(&LogOptions::default());
        init(&LogOptions {
            level: "debug".into(),
            dir: None,
        });
    }
}
