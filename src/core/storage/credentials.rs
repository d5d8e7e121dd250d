//! Credential store
//! Keeps the bearer token and its expiry across runs

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::core::models::Session;
use crate::error::{AdminError, AdminResult};

/// Durable home of the admin session.
///
/// Token and expiry are written and removed together; an implementation must
/// never expose one without the other.
pub trait CredentialStore: Send + Sync {
    fn save(&self, session: &Session) -> AdminResult<()>;
    fn load(&self) -> AdminResult<Option<Session>>;
    fn clear(&self) -> AdminResult<()>;
}

/// JSON document on disk, replaced atomically
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, session: &Session) -> AdminResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;

        // Atomic write
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .map_err(|e| AdminError::Storage(format!("Failed to write temp file: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| AdminError::Storage(format!("Failed to rename credentials: {}", e)))?;
        Ok(())
    }

    fn load(&self) -> AdminResult<Option<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable credentials at {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn clear(&self) -> AdminResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, session: &Session) -> AdminResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| AdminError::Storage(format!("Failed to acquire lock: {}", e)))?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> AdminResult<Option<Session>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| AdminError::Storage(format!("Failed to acquire lock: {}", e)))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> AdminResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| AdminError::Storage(format!("Failed to acquire lock: {}", e)))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        assert_eq!(store.load().unwrap(), None);

        let session = Session::new("abc", 1_700_000_000_000);
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session.clone()));
        assert!(!dir.path().join("credentials.json.tmp").exists());

        let replacement = Session::new("def", 1_700_000_360_000);
        store.save(&replacement).unwrap();
        assert_eq!(store.load().unwrap(), Some(replacement));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_treats_partial_document_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"token":"abc"}"#).unwrap();

        let store = FileCredentialStore::new(path);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_session(Session::new("abc", 5));
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
