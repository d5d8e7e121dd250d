//! In-process stand-in for the admin backend

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use sora_admin::core::models::ClientConfig;
use sora_admin::core::services::HttpEndpoint;
use sora_admin::core::storage::{CredentialStore, FileCredentialStore};
use sora_admin::core::traits::{DefaultStorageConfig, ManualClock, NoticeLog, StorageConfig};
use sora_admin::AdminState;

pub const ADMIN_KEY: &str = "secret";
pub const LOGIN_TOKEN: &str = "abc";
pub const START_MS: i64 = 1_700_000_000_000;
pub const MINUTE_MS: i64 = 60_000;

#[derive(Default)]
pub struct BackendState {
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub keys_calls: AtomicUsize,
    /// Refresh answers 401 when set
    pub refresh_fails: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    /// Number of upcoming `/api/keys` calls answered with `reject_status`
    pub reject_keys: AtomicUsize,
    pub reject_status: AtomicU64,
    /// Import answers `imported: 0` when set
    pub import_count_zero: AtomicBool,
    pub last_auth: Mutex<Option<String>>,
    pub last_body: Mutex<Option<Value>>,
}

impl BackendState {
    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn reject_next_keys_calls(&self, count: usize, status: u16) {
        self.reject_status.store(status as u64, Ordering::SeqCst);
        self.reject_keys.store(count, Ordering::SeqCst);
    }

    fn record(&self, headers: &HeaderMap, body: Option<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *self.last_auth.lock().unwrap() = auth;
        if body.is_some() {
            *self.last_body.lock().unwrap() = body;
        }
    }
}

type Shared = Arc<BackendState>;

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/keys", get(list_keys).post(create_key))
            .route("/api/keys/test", post(test_key))
            .route("/api/keys/batch", post(batch))
            .route(
                "/api/keys/:id",
                get(get_key).put(update_key).delete(delete_key),
            )
            .route("/api/stats", get(stats))
            .route("/api/config", get(get_config).post(save_config))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Admin state wired to a mock backend, a manual clock and a file store
pub struct Harness {
    pub backend: MockBackend,
    pub state: AdminState,
    pub clock: Arc<ManualClock>,
    pub notices: Arc<NoticeLog>,
    pub store: Arc<FileCredentialStore>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let backend = MockBackend::start().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = DefaultStorageConfig::with_path(dir.path().to_path_buf()).unwrap();
        let store = Arc::new(FileCredentialStore::new(storage.credentials_path()));
        Self::with_store(backend, dir, storage, store)
    }

    pub fn with_store(
        backend: MockBackend,
        dir: tempfile::TempDir,
        storage: DefaultStorageConfig,
        store: Arc<FileCredentialStore>,
    ) -> Self {
        let config = ClientConfig {
            base_url: backend.base_url.clone(),
            ..ClientConfig::default()
        };
        let http = HttpEndpoint::new(&config.base_url, Duration::from_secs(5)).unwrap();
        let clock = Arc::new(ManualClock::new(START_MS));
        let notices = Arc::new(NoticeLog::new());
        let state = AdminState::with_parts(
            storage,
            config,
            http,
            store.clone(),
            clock.clone(),
            notices.clone(),
        );
        Self {
            backend,
            state,
            clock,
            notices,
            store,
            _dir: dir,
        }
    }

    pub fn backend(&self) -> &BackendState {
        &self.backend.state
    }

    pub async fn login(&self) {
        self.state.session.login(ADMIN_KEY).await.unwrap();
        self.notices.drain();
    }

    pub fn stored(&self) -> Option<sora_admin::core::models::Session> {
        self.store.load().unwrap()
    }
}

fn token_body(token: &str) -> Json<Value> {
    Json(json!({ "token": token, "expires_in": 3600 }))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Invalid or expired token" })),
    )
        .into_response()
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["admin_key"] == ADMIN_KEY {
        token_body(LOGIN_TOKEN).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid admin key" })),
        )
            .into_response()
    }
}

async fn refresh(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state.refresh_fails.load(Ordering::SeqCst) || !has_bearer(&headers) {
        return unauthorized();
    }
    token_body(&format!("refreshed-{}", call)).into_response()
}

fn key_record(id: &str, name: &str, created_at: f64, enabled: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "key": format!("sk-{}-0123456789", id),
        "weight": 2,
        "max_rpm": 30,
        "is_enabled": enabled,
        "created_at": created_at,
        "notes": "seeded"
    })
}

async fn list_keys(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.keys_calls.fetch_add(1, Ordering::SeqCst);
    state.record(&headers, None);
    if !has_bearer(&headers) {
        return unauthorized();
    }
    let pending = state.reject_keys.load(Ordering::SeqCst);
    if pending > 0 {
        state.reject_keys.store(pending - 1, Ordering::SeqCst);
        let status = state.reject_status.load(Ordering::SeqCst) as u16;
        return (
            StatusCode::from_u16(status).unwrap_or(StatusCode::FORBIDDEN),
            Json(json!({ "detail": "Forbidden" })),
        )
            .into_response();
    }
    let mut staging = key_record("k2", "Staging", 1_700_000_300.0, false);
    staging["temp_disabled_until"] = json!(1_700_003_600.123456);
    staging["temp_disabled_until_formatted"] = json!("2023-11-14 23:13:20");
    staging["temp_disabled_remaining"] = json!(3_599);
    Json(json!([
        key_record("k1", "Production", 1_700_000_100.0, true),
        staging,
        key_record("k3", "Backup", 1_700_000_200.0, true),
    ]))
    .into_response()
}

async fn get_key(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers, None);
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Key not found" })),
        )
            .into_response();
    }
    Json(key_record(&id, "Production", 1_700_000_100.0, true)).into_response()
}

async fn create_key(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers, Some(body));
    Json(json!({ "status": "success", "id": "k9" })).into_response()
}

async fn update_key(
    State(state): State<Shared>,
    Path(_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers, Some(body));
    Json(json!({ "status": "success" })).into_response()
}

async fn delete_key(
    State(state): State<Shared>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers, None);
    StatusCode::NO_CONTENT.into_response()
}

async fn test_key(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record(&headers, Some(body.clone()));
    let key = body["key_value"].as_str().unwrap_or_default();
    if key.starts_with("sk-") {
        Json(json!({ "status": "success", "message": "Key is valid" })).into_response()
    } else {
        Json(json!({ "status": "error", "message": "Upstream rejected the key" })).into_response()
    }
}

async fn batch(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record(&headers, Some(body.clone()));
    if body["action"] == "import" {
        let count = if state.import_count_zero.load(Ordering::SeqCst) {
            0
        } else {
            body["keys"].as_array().map(|k| k.len()).unwrap_or(0)
        };
        return Json(json!({ "success": true, "imported": count, "skipped": 0 })).into_response();
    }
    let results: serde_json::Map<String, Value> = body["key_ids"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|id| id.as_str())
        .map(|id| {
            let result = if id == "locked" { "failed" } else { "success" };
            (id.to_string(), json!(result))
        })
        .collect();
    Json(json!({ "status": "success", "results": results })).into_response()
}

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record(&headers, None);
    Json(json!({
        "total_keys": 3,
        "active_keys": 2,
        "total_requests": 200,
        "successful_requests": 150,
        "failed_requests": 50,
        "daily_usage": { "2024-01-01": 20 },
        "keys_usage": { "Production": 120, "Backup": 80 }
    }))
    .into_response()
}

async fn get_config(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.record(&headers, None);
    Json(json!({
        "HOST": "0.0.0.0",
        "PORT": 8890,
        "PROXY_HOST": "",
        "PROXY_PORT": "",
        "PROXY_PASS": "",
        "IMAGE_LOCALIZATION": false,
        "API_AUTH_TOKEN": true
    }))
    .into_response()
}

async fn save_config(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers, Some(body));
    Json(json!({ "status": "success", "message": "Configuration saved" })).into_response()
}
