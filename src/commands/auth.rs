use super::{Outcome, StatusReport};
use crate::core::traits::Notice;
use crate::state::AdminState;

pub async fn login(state: &AdminState, admin_key: &str) -> Outcome {
    match state.session.login(admin_key).await {
        Ok(session) => {
            state.notifier.notify(Notice::success("Login successful"));
            Outcome::LoggedIn {
                admin: session.masked_token(),
                expires_at_ms: session.expires_at_ms,
            }
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Outcome::LoginFailed {
                message: e.to_string(),
            }
        }
    }
}

pub async fn logout(state: &AdminState) -> Outcome {
    match state.session.logout().await {
        Ok(()) => {
            state.notifier.notify(Notice::info("Logged out"));
            Outcome::LoggedOut
        }
        Err(e) => {
            tracing::error!("Failed to clear stored credentials: {}", e);
            state
                .notifier
                .notify(Notice::error(format!("Logout failed: {}", e)));
            Outcome::Abandoned
        }
    }
}

pub async fn status(state: &AdminState) -> Outcome {
    let now = state.session.now_ms();
    let session = state.session.current().await;
    Outcome::Status(StatusReport {
        state: state.session.state().await,
        base_url: state.config.base_url.clone(),
        admin: session.as_ref().map(|s| s.masked_token()),
        expires_at_ms: session.as_ref().map(|s| s.expires_at_ms),
        remaining_secs: session.as_ref().map(|s| s.remaining_ms(now).max(0) / 1000),
    })
}
