//! HTTP plumbing shared by the session controller and the gateway

use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::error::AdminResult;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Backend base URL plus the pooled client used to reach it
#[derive(Clone)]
pub struct HttpEndpoint {
    client: Client,
    base_url: Url,
}

impl HttpEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> AdminResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sora-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> AdminResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Keep any path prefix when joining endpoint paths
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> AdminResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

/// Pull the human-readable error out of a failed response body.
/// The backend uses `detail`; some handlers answer with `message`.
pub async fn error_detail(response: Response) -> Option<String> {
    let body = response.bytes().await.ok()?;
    let value: serde_json::Value = serde_json::from_slice(&body).ok()?;
    detail_from_value(&value)
}

pub(crate) fn detail_from_value(value: &serde_json::Value) -> Option<String> {
    ["detail", "message"].iter().find_map(|field| {
        match value.get(*field)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    })
}
