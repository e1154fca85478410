//! Log setup
//!
//! The countdown owns the terminal, so logs go to a daily-rotated file under
//! the cache directory instead of stderr. `RUST_LOG` overrides the default
//! `info` level.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "nextmatch.log";

/// Builds the level filter from `RUST_LOG`, falling back to `info`
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber writing to `log_dir`
///
/// The returned guard flushes buffered lines when dropped, so keep it alive
/// for the life of the program. Returns `None` (and logs nowhere) if a
/// subscriber is already installed.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
