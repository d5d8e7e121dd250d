//! Log setup
//! Console on stderr plus a daily rolling file under `<data_dir>/logs`

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AdminResult;

pub const LOG_FILE_PREFIX: &str = "sora-admin.log";
const LOG_RETENTION_DAYS: u64 = 7;

struct LocalTimer;

impl fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().to_rfc3339())
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. `RUST_LOG` overrides the `default_filter`.
pub fn init_logger(log_dir: &Path, default_filter: &str) -> AdminResult<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_timer(LocalTimer);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(LocalTimer);
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    tracing::debug!("Logging to {}", log_dir.display());
    match cleanup_old_logs(log_dir, LOG_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(count) => tracing::debug!("Removed {} expired log files", count),
        Err(e) => tracing::warn!("Failed to clean up old logs: {}", e),
    }
    Ok(guard)
}

/// Delete log files last modified more than `days_to_keep` days ago
pub fn cleanup_old_logs(log_dir: &Path, days_to_keep: u64) -> AdminResult<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days_to_keep * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted = 0;
    for entry in fs::read_dir(log_dir)?.flatten() {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !path.is_file() || !is_log {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified());
        if matches!(modified, Ok(time) if time < cutoff) {
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => tracing::warn!("Failed to delete old log file {:?}: {}", path, e),
            }
        }
    }
    Ok(deleted)
}
