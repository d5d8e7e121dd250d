//! Authenticated request gateway
//! Every admin API call goes through here: proactive refresh, bearer header,
//! one reactive refresh-and-retry on 401/403, notices on failure

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use super::http::{error_detail, HttpEndpoint};
use super::session::SessionController;
use crate::core::models::Session;
use crate::core::traits::{Notice, Notifier};
use crate::error::{AdminError, AdminResult};

/// Method, body and extra headers of a gateway call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Caller headers plus the bearer token, and a JSON content type for
    /// POST/PUT bodies unless one was given
    pub fn build_headers(&self, token: &str) -> AdminResult<HeaderMap> {
        let mut headers = self.headers.clone();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            AdminError::Validation("Token contains characters not allowed in a header".into())
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let sends_body = matches!(self.method, Method::POST | Method::PUT) && self.body.is_some();
        if sends_body && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }
}

pub struct Gateway {
    http: HttpEndpoint,
    session: SessionController,
    notifier: Arc<dyn Notifier>,
}

impl Gateway {
    pub fn new(http: HttpEndpoint, session: SessionController, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http,
            session,
            notifier,
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Perform an authenticated call.
    ///
    /// Never errors: `None` means the operation did not complete and a notice
    /// has already been emitted.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Option<Value> {
        match self.try_request(path, options).await {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    /// `request` plus decoding into `T`
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Option<T> {
        let value = self.request(path, options).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.report(&AdminError::Decode(format!("{}: {}", path, e)));
                None
            }
        }
    }

    /// The gateway algorithm with the failure kept as a value
    pub async fn try_request(&self, path: &str, options: RequestOptions) -> AdminResult<Value> {
        let session = self.ensure_fresh(path).await?;
        let url = self.http.url(path)?;

        let response = self.dispatch(&url, &options, &session.token).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return self.retry_after_refresh(&url, &options, status).await;
        }

        if !status.is_success() {
            return Err(request_error(status, response).await);
        }

        decode_body(response).await
    }

    /// Refresh before dispatch when the token is close to expiry
    async fn ensure_fresh(&self, path: &str) -> AdminResult<Session> {
        let Some(session) = self.session.current().await else {
            return Err(AdminError::NotAuthenticated);
        };

        if !session.needs_refresh(self.session.now_ms()) {
            return Ok(session);
        }

        tracing::debug!("Token close to expiry, refreshing before {}", path);
        match self.session.refresh().await {
            Some(renewed) => Ok(renewed),
            None => {
                self.clear_session().await;
                Err(AdminError::SessionExpired)
            }
        }
    }

    /// One refresh and one retry; anything else ends the session
    async fn retry_after_refresh(
        &self,
        url: &Url,
        options: &RequestOptions,
        status: StatusCode,
    ) -> AdminResult<Value> {
        tracing::warn!("{} {} rejected with {}, refreshing token", options.method, url.path(), status);

        if let Some(renewed) = self.session.refresh().await {
            match self.dispatch(url, options, &renewed.token).await {
                Ok(retry) if retry.status().is_success() => return decode_body(retry).await,
                Ok(retry) => {
                    tracing::warn!("Retry of {} failed with {}", url.path(), retry.status());
                }
                Err(e) => {
                    tracing::warn!("Retry of {} failed: {}", url.path(), e);
                }
            }
        }

        self.clear_session().await;
        Err(AdminError::SessionExpired)
    }

    async fn dispatch(
        &self,
        url: &Url,
        options: &RequestOptions,
        token: &str,
    ) -> AdminResult<Response> {
        let headers = options.build_headers(token)?;
        let mut request = self
            .http
            .client()
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let start = Instant::now();
        let response = request.send().await?;
        tracing::info!(
            "{} {} - status: {}, latency: {}ms",
            options.method,
            url.path(),
            response.status(),
            start.elapsed().as_millis()
        );
        Ok(response)
    }

    async fn clear_session(&self) {
        if let Err(e) = self.session.logout().await {
            tracing::error!("Failed to clear stored credentials: {}", e);
        }
    }

    fn report(&self, error: &AdminError) {
        let notice = if error.is_session_error() {
            Notice::warning(error.to_string())
        } else {
            Notice::error(error.to_string())
        };
        tracing::debug!("Gateway call abandoned: {}", error);
        self.notifier.notify(notice);
    }
}

async fn request_error(status: StatusCode, response: Response) -> AdminError {
    let message = match error_detail(response).await {
        Some(detail) => detail,
        None => match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => status.as_str().to_string(),
        },
    };
    AdminError::Request {
        status: status.as_u16(),
        message,
    }
}

async fn decode_body(response: Response) -> AdminResult<Value> {
    let body = response.bytes().await?;
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| AdminError::Decode(e.to_string()))
}
