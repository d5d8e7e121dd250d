use super::{or_abandoned, DashboardView, Outcome};
use crate::core::services::keys::{key_counts, recent_keys};
use crate::core::services::{summarize, KeyService, StatsService};
use crate::state::AdminState;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn show(state: &AdminState) -> Outcome {
    or_abandoned(StatsService::load(&state.gateway).await, |stats| {
        Outcome::Stats(summarize(&stats, today()))
    })
}

/// Key cards and recent keys; stats are optional so a failing stats call
/// still leaves a usable dashboard
pub async fn dashboard(state: &AdminState) -> Outcome {
    let Some(keys) = KeyService::list(&state.gateway).await else {
        return Outcome::Abandoned;
    };
    let stats = StatsService::load(&state.gateway)
        .await
        .map(|stats| summarize(&stats, today()));

    Outcome::Dashboard(DashboardView {
        keys: key_counts(&keys),
        stats,
        recent_keys: recent_keys(&keys).into_iter().cloned().collect(),
    })
}
