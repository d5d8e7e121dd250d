//! API key service
//! CRUD, test, batch and import calls plus listing helpers

use serde::Serialize;

use super::gateway::{Gateway, RequestOptions};
use crate::core::models::{
    ApiKeyRecord, BatchAction, BatchRequest, BatchResponse, ImportCandidate, ImportOutcome,
    ImportRequest, ImportResponse, KeyDraft, KeyTestRequest, KeyTestResponse,
};
use crate::core::traits::Notice;

pub const KEYS_PATH: &str = "/api/keys";
pub const KEYS_TEST_PATH: &str = "/api/keys/test";
pub const KEYS_BATCH_PATH: &str = "/api/keys/batch";

const RECENT_KEYS: usize = 5;

pub struct KeyService;

impl KeyService {
    pub async fn list(gateway: &Gateway) -> Option<Vec<ApiKeyRecord>> {
        gateway.fetch(KEYS_PATH, RequestOptions::get()).await
    }

    pub async fn get(gateway: &Gateway, key_id: &str) -> Option<ApiKeyRecord> {
        gateway
            .fetch(&key_path(key_id), RequestOptions::get())
            .await
    }

    pub async fn create(gateway: &Gateway, draft: &KeyDraft) -> Option<serde_json::Value> {
        if !Self::validate_draft(gateway, draft) {
            return None;
        }
        let body = to_body(draft)?;
        let result = gateway.request(KEYS_PATH, RequestOptions::post(body)).await?;
        gateway.notify(Notice::success("Key saved"));
        Some(result)
    }

    pub async fn update(
        gateway: &Gateway,
        key_id: &str,
        draft: &KeyDraft,
    ) -> Option<serde_json::Value> {
        if !Self::validate_draft(gateway, draft) {
            return None;
        }
        let body = to_body(draft)?;
        let result = gateway
            .request(&key_path(key_id), RequestOptions::put(body))
            .await?;
        gateway.notify(Notice::success("Key saved"));
        Some(result)
    }

    pub async fn delete(gateway: &Gateway, key_id: &str) -> Option<serde_json::Value> {
        let result = gateway
            .request(&key_path(key_id), RequestOptions::delete())
            .await?;
        gateway.notify(Notice::success("Key deleted"));
        Some(result)
    }

    /// Ask the backend to try a key upstream; `Some(true)` when it works
    pub async fn test(gateway: &Gateway, name: &str, key_value: &str) -> Option<bool> {
        if key_value.trim().is_empty() {
            gateway.notify(Notice::warning("Please enter a valid key value"));
            return None;
        }
        let name = if name.trim().is_empty() {
            "New Key"
        } else {
            name
        };
        let body = to_body(&KeyTestRequest {
            name: name.to_string(),
            key_value: key_value.to_string(),
        })?;
        let response: KeyTestResponse = gateway
            .fetch(KEYS_TEST_PATH, RequestOptions::post(body))
            .await?;

        if response.passed() {
            gateway.notify(Notice::success(format!(
                "Test successful: {}",
                response.message.as_deref().unwrap_or("Key is valid")
            )));
        } else {
            gateway.notify(Notice::warning(format!(
                "Test failed: {}",
                response.message.as_deref().unwrap_or("Key cannot connect")
            )));
        }
        Some(response.passed())
    }

    pub async fn batch(
        gateway: &Gateway,
        action: BatchAction,
        key_ids: &[String],
    ) -> Option<BatchResponse> {
        if key_ids.is_empty() {
            gateway.notify(Notice::warning("Please select at least one key"));
            return None;
        }
        let body = to_body(&BatchRequest { action, key_ids })?;
        let response: BatchResponse = gateway
            .fetch(KEYS_BATCH_PATH, RequestOptions::post(body))
            .await?;

        let failed = response.failed_ids();
        if failed.is_empty() {
            gateway.notify(Notice::success(action.success_message()));
        } else {
            gateway.notify(Notice::warning(format!(
                "{} ({} of {} keys failed)",
                action.success_message(),
                failed.len(),
                key_ids.len()
            )));
        }
        Some(response)
    }

    /// Submit confirmed import candidates
    pub async fn import(
        gateway: &Gateway,
        candidates: &[ImportCandidate],
    ) -> Option<ImportOutcome> {
        if candidates.is_empty() {
            gateway.notify(Notice::warning("No keys to import"));
            return None;
        }
        let body = to_body(&ImportRequest {
            action: "import",
            keys: candidates,
        })?;
        let response: ImportResponse = gateway
            .fetch(KEYS_BATCH_PATH, RequestOptions::post(body))
            .await?;

        if !response.success {
            gateway.notify(Notice::error(format!(
                "Import failed: {}",
                response.message.as_deref().unwrap_or("Unknown error")
            )));
            return None;
        }

        let outcome = ImportOutcome {
            // A zero count means the backend didn't report one
            imported: response
                .imported
                .filter(|n| *n > 0)
                .unwrap_or(candidates.len()),
            skipped_duplicates: response.skipped.unwrap_or(0),
        };
        gateway.notify(Notice::success(outcome.message()));
        Some(outcome)
    }

    fn validate_draft(gateway: &Gateway, draft: &KeyDraft) -> bool {
        if draft.name.trim().is_empty() || draft.key_value.trim().is_empty() {
            gateway.notify(Notice::warning("Key name and value cannot be empty"));
            return false;
        }
        true
    }
}

fn key_path(key_id: &str) -> String {
    format!("{}/{}", KEYS_PATH, key_id)
}

fn to_body<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::error!("Failed to encode request body: {}", e);
            None
        }
    }
}

/// Case-insensitive match on name or key; an empty term keeps everything
pub fn filter_keys<'a>(keys: &'a [ApiKeyRecord], term: &str) -> Vec<&'a ApiKeyRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return keys.iter().collect();
    }
    keys.iter()
        .filter(|k| k.name.to_lowercase().contains(&term) || k.key.to_lowercase().contains(&term))
        .collect()
}

/// Newest first by creation time
pub fn recent_keys(keys: &[ApiKeyRecord]) -> Vec<&ApiKeyRecord> {
    let mut sorted: Vec<&ApiKeyRecord> = keys.iter().collect();
    sorted.sort_by_key(|k| std::cmp::Reverse(k.created_at_secs()));
    sorted.truncate(RECENT_KEYS);
    sorted
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into pages of `per_page`, clamping `page` into range
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);
    Page {
        items: items[start.min(total_items)..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}

/// Counts behind the dashboard key cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyCounts {
    pub total: usize,
    pub enabled: usize,
}

pub fn key_counts(keys: &[ApiKeyRecord]) -> KeyCounts {
    KeyCounts {
        total: keys.len(),
        enabled: keys.iter().filter(|k| k.is_enabled).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::DEFAULT_PAGE_SIZE;
    use serde_json::json;

    fn record(id: &str, name: &str, key: &str, created_at: f64, enabled: bool) -> ApiKeyRecord {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "key": key,
            "created_at": created_at,
            "is_enabled": enabled
        }))
        .unwrap()
    }

    fn sample() -> Vec<ApiKeyRecord> {
        (0..23)
            .map(|i| {
                record(
                    &format!("id-{}", i),
                    &format!("Key {}", i),
                    &format!("sk-{:06}", i),
                    1_700_000_000.0 + i as f64,
                    i % 3 != 0,
                )
            })
            .collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_over_name_and_key() {
        let keys = vec![
            record("1", "Production", "sk-AAA111", 1.0, true),
            record("2", "staging", "sk-bbb222", 2.0, true),
        ];
        assert_eq!(filter_keys(&keys, "PROD").len(), 1);
        assert_eq!(filter_keys(&keys, "BBB").len(), 1);
        assert_eq!(filter_keys(&keys, "sk-").len(), 2);
        assert_eq!(filter_keys(&keys, "  ").len(), 2);
        assert!(filter_keys(&keys, "nope").is_empty());
    }

    #[test]
    fn test_paginate() {
        let keys = sample();
        let first = paginate(&keys, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = paginate(&keys, 3, DEFAULT_PAGE_SIZE);
        assert_eq!(last.items.len(), 3);
        assert_eq!(last.items[0].id, "id-20");
        assert!(!last.has_next());

        let clamped = paginate(&keys, 99, DEFAULT_PAGE_SIZE);
        assert_eq!(clamped.page, 3);
        assert_eq!(paginate(&keys, 0, DEFAULT_PAGE_SIZE).page, 1);
    }

    #[test]
    fn test_paginate_empty() {
        let empty: Vec<ApiKeyRecord> = Vec::new();
        let page = paginate(&empty, 4, DEFAULT_PAGE_SIZE);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_recent_keys_are_newest_first() {
        let keys = sample();
        let recent = recent_keys(&keys);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, "id-22");
        assert_eq!(recent[4].id, "id-18");
    }

    #[test]
    fn test_key_counts() {
        let counts = key_counts(&sample());
        assert_eq!(counts.total, 23);
        assert_eq!(counts.enabled, 15);
    }
}
