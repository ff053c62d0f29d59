//! Tracing subscriber setup: stderr by default, daily-rotated files when
//! `logging-to-file` is enabled.

use crate::config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "genrelay.log";
const DEFAULT_LOG_DIR: &str = "./logs";

/// `RUST_LOG` wins over the CLI level; an unparsable level falls back to `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when logging to a file; it must be held
/// until exit so buffered lines are flushed.
pub fn init_logging(level: &str, config: Option<&Config>) -> Option<WorkerGuard> {
    let filter = build_filter(level);

    match config.filter(|c| c.logging_to_file) {
        Some(cfg) => {
            let dir = cfg.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();

            None
        }
    }
}
