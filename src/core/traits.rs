//! Core traits
//! Decouple session and request logic from the front end driving it

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::error::{AdminError, AdminResult};

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message for the user (the toast of a graphical front end)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Notice sink
/// A CLI prints notices, a GUI would show toasts, tests record them
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps notices in memory until the front end drains them
#[derive(Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all pending notices, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, "notice: {}", notice.message);
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

/// Wall clock in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Storage layout
/// Abstracts the data directory and the files kept in it
pub trait StorageConfig: Send + Sync {
    fn data_dir(&self) -> PathBuf;

    /// Bearer token and its expiry
    fn credentials_path(&self) -> PathBuf {
        self.data_dir().join("credentials.json")
    }

    /// Local client settings
    fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.json")
    }

    fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

/// Default storage (`~/.sora_admin/`)
pub struct DefaultStorageConfig {
    data_dir: PathBuf,
}

impl DefaultStorageConfig {
    pub fn new() -> AdminResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AdminError::Storage("Cannot determine home directory".to_string()))?;
        Self::with_path(home.join(".sora_admin"))
    }

    pub fn with_path(data_dir: PathBuf) -> AdminResult<Self> {
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            AdminError::Storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(Self { data_dir })
    }
}

impl StorageConfig for DefaultStorageConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_log_drains_in_order() {
        let log = NoticeLog::new();
        log.notify(Notice::warning("first"));
        log.notify(Notice::error("second"));
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].level, NoticeLevel::Error);
        assert!(log.is_empty());
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_storage_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DefaultStorageConfig::with_path(dir.path().join("nested")).unwrap();
        assert!(storage.data_dir().exists());
        assert_eq!(
            storage.credentials_path(),
            dir.path().join("nested").join("credentials.json")
        );
        assert_eq!(storage.log_dir(), dir.path().join("nested").join("logs"));
    }
}
