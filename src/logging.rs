//! Tracing setup shared by the binaries.
//!
//! Console output always goes through `fmt` with an `EnvFilter` (default `info`,
//! overridable with `RUST_LOG`). Setting `ARB_LAB_LOG_DIR` additionally writes a
//! daily-rolling log file via a non-blocking appender.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_DIR_ENV: &str = "ARB_LAB_LOG_DIR";

/// Install the global subscriber. Keep the returned guard alive for the whole
/// program, otherwise buffered file output is dropped.
pub fn init(file_prefix: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, format!("{file_prefix}.log"));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            None
        }
    }
}
