use super::{or_abandoned, Outcome};
use crate::core::models::ConfigUpdate;
use crate::core::services::ConfigService;
use crate::state::AdminState;

pub async fn show(state: &AdminState) -> Outcome {
    or_abandoned(ConfigService::load(&state.gateway).await, Outcome::Config)
}

pub async fn save(state: &AdminState, update: &ConfigUpdate) -> Outcome {
    or_abandoned(
        ConfigService::save(&state.gateway, update).await,
        Outcome::ConfigSaved,
    )
}
