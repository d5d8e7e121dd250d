//! Core data models
//! Wire types of the admin API plus client-side session state

mod config;
mod key;
mod session;
mod stats;

pub use config::{
    ClientConfig, ConfigUpdate, ServerConfig, StatusMessage, DEFAULT_BASE_URL,
    DEFAULT_IMAGE_SAVE_DIR, DEFAULT_PAGE_SIZE,
};
pub use key::{
    ApiKeyRecord, BatchAction, BatchRequest, BatchResponse, ImportCandidate, ImportOutcome,
    ImportPreview, ImportRequest, ImportResponse, KeyDraft, KeyPatch, KeyStatus, KeyTestRequest,
    KeyTestResponse, SkipReason, SkippedLine,
};
pub use session::{
    is_valid, LoginRequest, Session, SessionState, TokenResponse, GRACE_MS, PROACTIVE_MS,
};
pub(crate) use session::mask;
pub use stats::{DayCounts, SeriesPoint, StatsSummary, UsageStats};
