//! Session lifecycle controller
//! Login, refresh-before-expiry, forced logout

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::CONTENT_TYPE;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::http::{error_detail, HttpEndpoint, LOGIN_PATH, REFRESH_PATH};
use crate::core::models::{is_valid, LoginRequest, Session, SessionState, TokenResponse};
use crate::core::storage::CredentialStore;
use crate::core::traits::{Clock, Notice, Notifier};
use crate::error::{AdminError, AdminResult};

const LOGIN_FAILED: &str = "Login failed. Please check the admin key";
const LOGIN_UNREACHABLE: &str = "Validation failed. Please try again later";
const EMPTY_ADMIN_KEY: &str = "Please enter the admin key";

type PendingRefresh = Shared<BoxFuture<'static, Option<Session>>>;

/// Owns the admin session.
///
/// Cheap to clone; clones share the same session, store and in-flight refresh.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: HttpEndpoint,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    session: RwLock<Option<Session>>,
    pending_refresh: Mutex<Option<PendingRefresh>>,
    login_in_flight: AtomicBool,
}

/// Clears the login flag when the attempt finishes, however it finishes
struct LoginGuard<'a>(&'a AtomicBool);

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    pub fn new(
        http: HttpEndpoint,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                http,
                store,
                clock,
                session: RwLock::new(None),
                pending_refresh: Mutex::new(None),
                login_in_flight: AtomicBool::new(false),
            }),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.inner.clock.now_ms()
    }

    /// Restore the stored session at startup.
    ///
    /// An expired session is torn down with a notice; one close to expiry is
    /// refreshed opportunistically, and a failed refresh keeps it until it lapses.
    pub async fn init(&self, notifier: &dyn Notifier) -> SessionState {
        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to load stored credentials: {}", e);
                None
            }
        };
        *self.inner.session.write().await = stored.clone();

        let Some(session) = stored else {
            return SessionState::LoggedOut;
        };

        let now = self.now_ms();
        if !is_valid(Some(&session), now) {
            tracing::info!("Stored session expired, logging out");
            self.force_logout(notifier).await;
            return SessionState::LoggedOut;
        }

        if session.needs_refresh(now) && self.refresh().await.is_none() {
            tracing::warn!("Startup refresh failed; keeping current session until it expires");
        }
        SessionState::LoggedIn
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    pub async fn is_valid(&self) -> bool {
        is_valid(self.inner.session.read().await.as_ref(), self.now_ms())
    }

    pub async fn state(&self) -> SessionState {
        if self.inner.pending_refresh.lock().await.is_some() {
            return SessionState::Refreshing;
        }
        if self.inner.session.read().await.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Masked token for an "Admin: …" label
    pub async fn admin_key_display(&self) -> Option<String> {
        self.inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.masked_token())
    }

    /// Exchange the admin key for a session.
    ///
    /// A second call while one is in flight is rejected rather than queued.
    pub async fn login(&self, admin_key: &str) -> AdminResult<Session> {
        let admin_key = admin_key.trim();
        if admin_key.is_empty() {
            return Err(AdminError::Auth(EMPTY_ADMIN_KEY.to_string()));
        }

        if self.inner.login_in_flight.swap(true, Ordering::SeqCst) {
            return Err(AdminError::LoginInProgress);
        }
        let _guard = LoginGuard(&self.inner.login_in_flight);

        let url = self.inner.http.url(LOGIN_PATH)?;
        let response = match self
            .inner
            .http
            .client()
            .post(url)
            .json(&LoginRequest { admin_key })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to validate admin key: {}", e);
                return Err(AdminError::Auth(LOGIN_UNREACHABLE.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Login rejected with status {}", status);
            let detail = error_detail(response).await;
            return Err(AdminError::Auth(
                detail.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdminError::Decode(format!("login response: {}", e)))?;
        let session = Session::issued(&token, self.now_ms());
        self.inner.install(&session).await?;

        tracing::info!(
            "Logged in as {}, token valid for {}s",
            session.masked_token(),
            token.expires_in
        );
        Ok(session)
    }

    /// Renew the current token.
    ///
    /// Never errors: `None` means the caller must re-authenticate. Concurrent
    /// callers share one in-flight refresh instead of each hitting the backend.
    pub async fn refresh(&self) -> Option<Session> {
        let pending = {
            let mut slot = self.inner.pending_refresh.lock().await;
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let pending = async move {
                        let result = inner.refresh_once().await;
                        inner.pending_refresh.lock().await.take();
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Drop the session locally and on disk. Safe to call repeatedly.
    pub async fn logout(&self) -> AdminResult<()> {
        *self.inner.session.write().await = None;
        self.inner.store.clear()
    }

    /// Logout forced by an unusable session
    pub async fn force_logout(&self, notifier: &dyn Notifier) {
        if let Err(e) = self.logout().await {
            tracing::error!("Failed to clear stored credentials: {}", e);
        }
        notifier.notify(Notice::warning(AdminError::SessionExpired.to_string()));
    }
}

impl SessionInner {
    async fn install(&self, session: &Session) -> AdminResult<()> {
        self.store.save(session)?;
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn refresh_once(&self) -> Option<Session> {
        let current = self.session.read().await.clone()?;

        let url = match self.http.url(REFRESH_PATH) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build refresh URL: {}", e);
                return None;
            }
        };

        tracing::info!("Refreshing admin token...");
        let response = match self
            .http
            .client()
            .post(url)
            .bearer_auth(&current.token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to refresh token: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Token refresh rejected with status {}", response.status());
            return None;
        }

        let token: TokenResponse = match response.json().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Unreadable refresh response: {}", e);
                return None;
            }
        };
        let renewed = Session::issued(&token, self.clock.now_ms());

        let mut slot = self.session.write().await;
        // Whatever landed while the call was in flight wins
        match slot.as_ref() {
            None => {
                tracing::info!("Logged out during refresh, discarding renewed token");
                return None;
            }
            Some(latest) if latest.token != current.token => {
                tracing::info!("Session replaced during refresh, keeping the newer one");
                return Some(latest.clone());
            }
            Some(_) => {}
        }
        if let Err(e) = self.store.save(&renewed) {
            tracing::warn!("Failed to persist refreshed token: {}", e);
        }
        *slot = Some(renewed.clone());
        tracing::info!("Token refreshed, valid for {}s", token.expires_in);
        Some(renewed)
    }
}
