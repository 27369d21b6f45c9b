//! Tracing setup: a per-session log file, optionally mirrored to stderr.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::dirs;

/// Installs the global subscriber. The returned guard flushes the file
/// writer when dropped, so keep it alive for the whole process.
pub fn init(verbose: bool) -> Result<WorkerGuard> {
    let session_log_dir = dirs::log_dir().join(dirs::new_session_id());
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("Failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "combat.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::debug!(log_dir = %session_log_dir.display(), "logging initialized");
    Ok(guard)
}
