//! Client configuration storage
//! Persists `ClientConfig` as JSON in the data directory

use std::fs;

use crate::core::models::ClientConfig;
use crate::core::traits::StorageConfig;
use crate::error::{AdminError, AdminResult};

pub struct ConfigStorage;

impl ConfigStorage {
    /// Load the client config, writing defaults on first run
    pub fn load<S: StorageConfig>(storage: &S) -> AdminResult<ClientConfig> {
        let config_path = storage.config_path();
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: ClientConfig = serde_json::from_str(&content).map_err(|e| {
                AdminError::Storage(format!(
                    "Failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            return Ok(config);
        }

        let default_config = ClientConfig::default();
        Self::save(storage, &default_config)?;
        tracing::info!("Wrote default client config to {}", config_path.display());
        Ok(default_config)
    }

    pub fn save<S: StorageConfig>(storage: &S, config: &ClientConfig) -> AdminResult<()> {
        let config_path = storage.config_path();
        let content = serde_json::to_string_pretty(config)?;

        let temp_path = config_path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .map_err(|e| AdminError::Storage(format!("Failed to write temp file: {}", e)))?;
        fs::rename(&temp_path, &config_path)
            .map_err(|e| AdminError::Storage(format!("Failed to rename config: {}", e)))?;
        Ok(())
    }
}
