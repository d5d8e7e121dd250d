//! Configuration models
//! Server-side proxy/image settings and the local client settings

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8890";
pub const DEFAULT_IMAGE_SAVE_DIR: &str = "src/static/images";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Ports may come back as a number or a string
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// `GET /api/config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(rename = "HOST", deserialize_with = "string_or_number")]
    pub host: String,
    #[serde(rename = "PORT", deserialize_with = "string_or_number")]
    pub port: String,
    #[serde(rename = "BASE_URL", deserialize_with = "string_or_number")]
    pub base_url: String,
    #[serde(rename = "PROXY_HOST", deserialize_with = "string_or_number")]
    pub proxy_host: String,
    #[serde(rename = "PROXY_PORT", deserialize_with = "string_or_number")]
    pub proxy_port: String,
    #[serde(rename = "PROXY_USER", deserialize_with = "string_or_number")]
    pub proxy_user: String,
    /// Masked by the backend when set
    #[serde(rename = "PROXY_PASS", deserialize_with = "string_or_number")]
    pub proxy_pass: String,
    #[serde(rename = "IMAGE_LOCALIZATION")]
    pub image_localization: bool,
    #[serde(rename = "IMAGE_SAVE_DIR", deserialize_with = "string_or_number")]
    pub image_save_dir: String,
    /// Whether an API auth token is configured; the value itself is never returned
    #[serde(rename = "API_AUTH_TOKEN")]
    pub api_auth_token: bool,
}

impl ServerConfig {
    pub fn has_proxy_password(&self) -> bool {
        !self.proxy_pass.is_empty()
    }

    pub fn image_save_dir_or_default(&self) -> &str {
        if self.image_save_dir.is_empty() {
            DEFAULT_IMAGE_SAVE_DIR
        } else {
            &self.image_save_dir
        }
    }
}

fn default_true() -> bool {
    true
}

/// `POST /api/config`; absent fields are left unchanged server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(rename = "PROXY_HOST", skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
    #[serde(rename = "PROXY_PORT", skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<String>,
    #[serde(rename = "PROXY_USER", skip_serializing_if = "Option::is_none")]
    pub proxy_user: Option<String>,
    #[serde(rename = "PROXY_PASS", skip_serializing_if = "Option::is_none")]
    pub proxy_pass: Option<String>,
    #[serde(rename = "BASE_URL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "IMAGE_LOCALIZATION", skip_serializing_if = "Option::is_none")]
    pub image_localization: Option<bool>,
    #[serde(rename = "IMAGE_SAVE_DIR", skip_serializing_if = "Option::is_none")]
    pub image_save_dir: Option<String>,
    #[serde(default = "default_true")]
    pub save_to_env: bool,
}

impl Default for ConfigUpdate {
    fn default() -> Self {
        Self {
            proxy_host: None,
            proxy_port: None,
            proxy_user: None,
            proxy_pass: None,
            base_url: None,
            image_localization: None,
            image_save_dir: None,
            save_to_env: true,
        }
    }
}

impl ConfigUpdate {
    /// Set the proxy password only when a value was actually entered
    pub fn with_proxy_pass(mut self, pass: Option<String>) -> Self {
        self.proxy_pass = pass
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.proxy_host.is_none()
            && self.proxy_port.is_none()
            && self.proxy_user.is_none()
            && self.proxy_pass.is_none()
            && self.base_url.is_none()
            && self.image_localization.is_none()
            && self.image_save_dir.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Local client settings, persisted as `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub page_size: usize,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
