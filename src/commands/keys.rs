use super::{or_abandoned, Outcome};
use crate::core::models::{BatchAction, KeyDraft, KeyPatch};
use crate::core::services::import::parse_import;
use crate::core::services::keys::{filter_keys, paginate};
use crate::core::services::KeyService;
use crate::core::traits::Notice;
use crate::state::AdminState;

const NO_VALID_KEYS: &str = "No valid key data found";

pub async fn list(state: &AdminState, search: &str, page: usize) -> Outcome {
    let Some(keys) = KeyService::list(&state.gateway).await else {
        return Outcome::Abandoned;
    };
    let matching: Vec<_> = filter_keys(&keys, search).into_iter().cloned().collect();
    Outcome::Keys(paginate(&matching, page, state.config.page_size))
}

pub async fn show(state: &AdminState, id: &str) -> Outcome {
    or_abandoned(KeyService::get(&state.gateway, id).await, Outcome::Key)
}

pub async fn add(state: &AdminState, draft: &KeyDraft) -> Outcome {
    or_abandoned(
        KeyService::create(&state.gateway, draft).await,
        Outcome::KeySaved,
    )
}

/// Fetch the current record, merge the changed fields, save
pub async fn update(state: &AdminState, id: &str, patch: KeyPatch) -> Outcome {
    let Some(record) = KeyService::get(&state.gateway, id).await else {
        return Outcome::Abandoned;
    };
    let draft = patch.apply(&record);
    or_abandoned(
        KeyService::update(&state.gateway, id, &draft).await,
        Outcome::KeySaved,
    )
}

pub async fn delete(state: &AdminState, id: &str) -> Outcome {
    or_abandoned(KeyService::delete(&state.gateway, id).await, |_| {
        Outcome::KeyDeleted { id: id.to_string() }
    })
}

pub async fn test(state: &AdminState, name: &str, key_value: &str) -> Outcome {
    or_abandoned(
        KeyService::test(&state.gateway, name, key_value).await,
        |passed| Outcome::KeyTested { passed },
    )
}

pub async fn batch(state: &AdminState, action: BatchAction, ids: &[String]) -> Outcome {
    or_abandoned(
        KeyService::batch(&state.gateway, action, ids).await,
        Outcome::Batch,
    )
}

pub fn preview_import(state: &AdminState, text: &str, enabled: bool) -> Outcome {
    let preview = parse_import(text, enabled);
    if preview.is_empty() {
        state.notifier.notify(Notice::warning(NO_VALID_KEYS));
    } else if !preview.skipped.is_empty() {
        state.notifier.notify(Notice::info(preview.summary()));
    }
    Outcome::ImportPreview(preview)
}

pub async fn import(state: &AdminState, text: &str, enabled: bool) -> Outcome {
    let preview = parse_import(text, enabled);
    if preview.is_empty() {
        state.notifier.notify(Notice::warning(NO_VALID_KEYS));
        return Outcome::Abandoned;
    }
    if !preview.skipped.is_empty() {
        tracing::info!("{}", preview.summary());
    }
    or_abandoned(
        KeyService::import(&state.gateway, &preview.candidates).await,
        Outcome::Imported,
    )
}
