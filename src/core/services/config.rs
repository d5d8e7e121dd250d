//! Server configuration service

use super::gateway::{Gateway, RequestOptions};
use crate::core::models::{ConfigUpdate, ServerConfig, StatusMessage};
use crate::core::traits::Notice;

pub const CONFIG_PATH: &str = "/api/config";

pub struct ConfigService;

impl ConfigService {
    pub async fn load(gateway: &Gateway) -> Option<ServerConfig> {
        gateway.fetch(CONFIG_PATH, RequestOptions::get()).await
    }

    /// Push changed settings; the proxy password is only sent when entered
    pub async fn save(gateway: &Gateway, update: &ConfigUpdate) -> Option<StatusMessage> {
        if update.is_empty() {
            gateway.notify(Notice::warning("Nothing to save"));
            return None;
        }
        let body = match serde_json::to_value(update) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode config update: {}", e);
                return None;
            }
        };

        let response: StatusMessage = gateway
            .fetch(CONFIG_PATH, RequestOptions::post(body))
            .await?;
        gateway.notify(Notice::success(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Configuration saved".to_string()),
        ));
        Some(response)
    }
}
