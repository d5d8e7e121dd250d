use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    /// Bad admin credential; shown inline next to the login form.
    #[error("{0}")]
    Auth(String),

    #[error("Session expired. Please log in again")]
    SessionExpired,

    #[error("Not logged in. Please log in first")]
    NotAuthenticated,

    #[error("A login attempt is already in progress")]
    LoginInProgress,

    #[error("Request failed: {status} - {message}")]
    Request { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Validation(String),
}

impl AdminError {
    /// Errors after which the local session can no longer be used.
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

impl Serialize for AdminError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type AdminResult<T> = Result<T, AdminError>;
