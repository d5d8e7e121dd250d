use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::models::{ClientConfig, SessionState};
use crate::core::services::{Gateway, HttpEndpoint, SessionController};
use crate::core::storage::{ConfigStorage, CredentialStore, FileCredentialStore};
use crate::core::traits::{
    Clock, DefaultStorageConfig, Notifier, StorageConfig, SystemClock,
};
use crate::error::AdminResult;

/// Everything a front end needs to drive the admin API.
///
/// The session lives in an explicit controller shared by the gateway and
/// the command dispatcher, not in process-wide globals.
pub struct AdminState {
    pub storage: DefaultStorageConfig,
    pub config: ClientConfig,
    pub session: SessionController,
    pub gateway: Gateway,
    pub notifier: Arc<dyn Notifier>,
}

impl AdminState {
    /// Load (or create) the client config under `storage` and wire the
    /// file-backed credential store and system clock.
    ///
    /// `base_url_override` replaces the saved backend address and is
    /// persisted for later runs.
    pub fn with_data_dir(
        storage: DefaultStorageConfig,
        base_url_override: Option<String>,
        notifier: Arc<dyn Notifier>,
    ) -> AdminResult<Self> {
        let mut config = ConfigStorage::load(&storage)?;
        if let Some(base_url) = base_url_override {
            if base_url != config.base_url {
                tracing::info!("Backend address set to {}", base_url);
                config.base_url = base_url;
                ConfigStorage::save(&storage, &config)?;
            }
        }

        let http = HttpEndpoint::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(storage.credentials_path()));
        Ok(Self::with_parts(
            storage,
            config,
            http,
            store,
            Arc::new(SystemClock),
            notifier,
        ))
    }

    /// Assemble from explicit parts; tests swap in memory stores and manual clocks
    pub fn with_parts(
        storage: DefaultStorageConfig,
        config: ClientConfig,
        http: HttpEndpoint,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionController::new(http.clone(), store, clock);
        let gateway = Gateway::new(http, session.clone(), Arc::clone(&notifier));
        Self {
            storage,
            config,
            session,
            gateway,
            notifier,
        }
    }

    /// Restore the stored session; run once at startup
    pub async fn init(&self) -> SessionState {
        self.session.init(self.notifier.as_ref()).await
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir()
    }

    pub fn log_dir(&self) -> PathBuf {
        self.storage.log_dir()
    }
}
