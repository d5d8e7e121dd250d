//! Admin session model

use serde::{Deserialize, Serialize};

/// Safety margin so a token never expires while a request is in flight
pub const GRACE_MS: i64 = 10_000;

/// Remaining lifetime below which a refresh is attempted
pub const PROACTIVE_MS: i64 = 5 * 60_000;

/// Bearer token plus its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at_ms: i64,
}

impl Session {
    pub fn new(token: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            token: token.into(),
            expires_at_ms,
        }
    }

    /// Build a session from a login/refresh response received at `now_ms`
    pub fn issued(response: &TokenResponse, now_ms: i64) -> Self {
        Self::new(
            response.token.clone(),
            now_ms.saturating_add(response.expires_in.saturating_mul(1000)),
        )
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }

    pub fn needs_refresh(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) < PROACTIVE_MS
    }

    /// First 6 and last 4 characters, for display
    pub fn masked_token(&self) -> String {
        mask(&self.token, 6, 4)
    }
}

/// True iff a session is present and will outlive the grace window
pub fn is_valid(session: Option<&Session>, now_ms: i64) -> bool {
    match session {
        Some(s) => now_ms < s.expires_at_ms.saturating_sub(GRACE_MS),
        None => false,
    }
}

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
    Refreshing,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub admin_key: &'a str,
}

/// Body of a successful login or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

pub(crate) fn mask(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let head_part: String = chars.iter().take(head).collect();
    let tail_part: String = chars
        .iter()
        .skip(chars.len().saturating_sub(tail))
        .collect();
    format!("{}...{}", head_part, tail_part)
}
