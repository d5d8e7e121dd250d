//! Command dispatch
//! Maps user actions onto services, gating everything that needs a session

use serde::Serialize;

use crate::core::models::{
    ApiKeyRecord, BatchAction, BatchResponse, ConfigUpdate, ImportOutcome, ImportPreview,
    KeyDraft, KeyPatch, ServerConfig, SessionState, StatsSummary, StatusMessage,
};
use crate::core::services::keys::KeyCounts;
use crate::core::services::Page;
use crate::state::AdminState;

mod auth;
mod config;
mod keys;
mod stats;

/// A user action
#[derive(Debug, Clone)]
pub enum Command {
    Login { admin_key: String },
    Logout,
    Status,
    Dashboard,
    ListKeys { search: String, page: usize },
    ShowKey { id: String },
    AddKey(KeyDraft),
    UpdateKey { id: String, patch: KeyPatch },
    DeleteKey { id: String },
    TestKey { name: String, key_value: String },
    BatchKeys { action: BatchAction, ids: Vec<String> },
    PreviewImport { text: String, enabled: bool },
    Import { text: String, enabled: bool },
    ShowConfig,
    SaveConfig(ConfigUpdate),
    ShowStats,
}

impl Command {
    /// Commands that may run without a valid session
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Login { .. } | Self::Logout | Self::Status | Self::PreviewImport { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Status => "status",
            Self::Dashboard => "dashboard",
            Self::ListKeys { .. } => "list_keys",
            Self::ShowKey { .. } => "show_key",
            Self::AddKey(_) => "add_key",
            Self::UpdateKey { .. } => "update_key",
            Self::DeleteKey { .. } => "delete_key",
            Self::TestKey { .. } => "test_key",
            Self::BatchKeys { .. } => "batch_keys",
            Self::PreviewImport { .. } => "preview_import",
            Self::Import { .. } => "import",
            Self::ShowConfig => "show_config",
            Self::SaveConfig(_) => "save_config",
            Self::ShowStats => "show_stats",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state: SessionState,
    pub base_url: String,
    pub admin: Option<String>,
    pub expires_at_ms: Option<i64>,
    pub remaining_secs: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub keys: KeyCounts,
    /// Absent when the stats call failed
    pub stats: Option<StatsSummary>,
    pub recent_keys: Vec<ApiKeyRecord>,
}

/// Result of a dispatched command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    LoggedIn { admin: String, expires_at_ms: i64 },
    /// Credential rejected; shown inline rather than as a notice
    LoginFailed { message: String },
    LoggedOut,
    Status(StatusReport),
    Dashboard(DashboardView),
    Keys(Page<ApiKeyRecord>),
    Key(ApiKeyRecord),
    KeySaved(serde_json::Value),
    KeyDeleted { id: String },
    KeyTested { passed: bool },
    Batch(BatchResponse),
    ImportPreview(ImportPreview),
    Imported(ImportOutcome),
    Config(ServerConfig),
    ConfigSaved(StatusMessage),
    Stats(StatsSummary),
    /// The session was unusable and has been torn down
    SessionExpired,
    /// The service gave up; a notice says why
    Abandoned,
}

/// Run one command against `state`
pub async fn dispatch(state: &AdminState, command: Command) -> Outcome {
    tracing::debug!("Dispatching {}", command.name());

    if !command.is_public() && !state.session.is_valid().await {
        tracing::info!("{} needs a valid session, logging out", command.name());
        state.session.force_logout(state.notifier.as_ref()).await;
        return Outcome::SessionExpired;
    }

    match command {
        Command::Login { admin_key } => auth::login(state, &admin_key).await,
        Command::Logout => auth::logout(state).await,
        Command::Status => auth::status(state).await,
        Command::Dashboard => stats::dashboard(state).await,
        Command::ListKeys { search, page } => keys::list(state, &search, page).await,
        Command::ShowKey { id } => keys::show(state, &id).await,
        Command::AddKey(draft) => keys::add(state, &draft).await,
        Command::UpdateKey { id, patch } => keys::update(state, &id, patch).await,
        Command::DeleteKey { id } => keys::delete(state, &id).await,
        Command::TestKey { name, key_value } => keys::test(state, &name, &key_value).await,
        Command::BatchKeys { action, ids } => keys::batch(state, action, &ids).await,
        Command::PreviewImport { text, enabled } => keys::preview_import(state, &text, enabled),
        Command::Import { text, enabled } => keys::import(state, &text, enabled).await,
        Command::ShowConfig => config::show(state).await,
        Command::SaveConfig(update) => config::save(state, &update).await,
        Command::ShowStats => stats::show(state).await,
    }
}

/// `None` from a service means it already reported why
fn or_abandoned<T>(result: Option<T>, outcome: impl FnOnce(T) -> Outcome) -> Outcome {
    result.map(outcome).unwrap_or(Outcome::Abandoned)
}
