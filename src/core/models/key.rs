//! API key models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_weight() -> i64 {
    1
}

fn default_max_rpm() -> i64 {
    60
}

/// A pooled upstream key as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_weight")]
    pub weight: i64,
    #[serde(default = "default_max_rpm")]
    pub max_rpm: i64,
    #[serde(default)]
    pub is_enabled: bool,
    /// Epoch seconds, fractional as sent by the backend
    #[serde(default)]
    pub temp_disabled_until: Option<f64>,
    #[serde(default)]
    pub temp_disabled_until_formatted: Option<String>,
    /// Seconds until re-enabled
    #[serde(default)]
    pub temp_disabled_remaining: Option<i64>,
    #[serde(default)]
    pub created_at: Option<f64>,
    #[serde(default)]
    pub last_used: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ApiKeyRecord {
    pub fn status(&self) -> KeyStatus {
        if let Some(until) = self.temp_disabled_until {
            return KeyStatus::TemporarilyDisabled {
                until: until as i64,
                remaining_secs: self.temp_disabled_remaining.filter(|s| *s > 0),
            };
        }
        if self.is_enabled {
            KeyStatus::Enabled
        } else {
            KeyStatus::Disabled
        }
    }

    pub fn created_at_secs(&self) -> i64 {
        self.created_at.map(|t| t as i64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyStatus {
    Enabled,
    Disabled,
    TemporarilyDisabled {
        until: i64,
        remaining_secs: Option<i64>,
    },
}

impl KeyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::TemporarilyDisabled { .. } => "Temporarily Disabled",
        }
    }

    /// "Remaining 1h 5m" for temporarily disabled keys with a known countdown
    pub fn remaining_text(&self) -> Option<String> {
        match self {
            Self::TemporarilyDisabled {
                remaining_secs: Some(secs),
                ..
            } => {
                let hours = secs / 3600;
                let minutes = (secs % 3600) / 60;
                Some(format!("Remaining {}h {}m", hours, minutes))
            }
            _ => None,
        }
    }
}

/// Create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDraft {
    pub name: String,
    pub key_value: String,
    pub weight: i64,
    pub rate_limit: i64,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl KeyDraft {
    pub fn new(name: impl Into<String>, key_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_value: key_value.into(),
            weight: default_weight(),
            rate_limit: default_max_rpm(),
            is_enabled: true,
            notes: None,
        }
    }

    /// Pre-fill an edit form from an existing record
    pub fn from_record(record: &ApiKeyRecord) -> Self {
        Self {
            name: record.name.clone(),
            key_value: record.key.clone(),
            weight: record.weight,
            rate_limit: record.max_rpm,
            is_enabled: record.is_enabled,
            notes: record.notes.clone(),
        }
    }
}

/// Fields to change on an existing key; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyPatch {
    pub name: Option<String>,
    pub key_value: Option<String>,
    pub weight: Option<i64>,
    pub rate_limit: Option<i64>,
    pub is_enabled: Option<bool>,
    pub notes: Option<String>,
}

impl KeyPatch {
    pub fn apply(self, record: &ApiKeyRecord) -> KeyDraft {
        let current = KeyDraft::from_record(record);
        KeyDraft {
            name: self.name.unwrap_or(current.name),
            key_value: self.key_value.unwrap_or(current.key_value),
            weight: self.weight.unwrap_or(current.weight),
            rate_limit: self.rate_limit.unwrap_or(current.rate_limit),
            is_enabled: self.is_enabled.unwrap_or(current.is_enabled),
            notes: self.notes.or(current.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyTestRequest {
    pub name: String,
    pub key_value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyTestResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl KeyTestResponse {
    pub fn passed(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Enable,
    Disable,
    Delete,
}

impl BatchAction {
    pub fn confirm_message(&self, count: usize) -> String {
        match self {
            Self::Enable => format!(
                "Are you sure you want to enable the selected {} keys?",
                count
            ),
            Self::Disable => format!(
                "Are you sure you want to disable the selected {} keys?",
                count
            ),
            Self::Delete => format!(
                "Are you sure you want to delete the selected {} keys? This action cannot be undone!",
                count
            ),
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Enable => "Batch enable successful",
            Self::Disable => "Batch disable successful",
            Self::Delete => "Batch delete successful",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    pub action: BatchAction,
    pub key_ids: &'a [String],
}

/// Per-id outcome, `"success"` or `"failed"`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: BTreeMap<String, String>,
}

impl BatchResponse {
    pub fn failed_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| r.as_str() != "success")
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// A key parsed from pasted import text, awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCandidate {
    pub name: String,
    pub key: String,
    pub weight: i64,
    pub rate_limit: i64,
    pub enabled: bool,
}

/// A line the import parser dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based, counting non-blank lines
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    TooFewFields,
    KeyTooShort,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields => write!(f, "fewer than 2 fields"),
            Self::KeyTooShort => write!(f, "key too short"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    pub candidates: Vec<ImportCandidate>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRequest<'a> {
    pub action: &'static str,
    pub keys: &'a [ImportCandidate],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub imported: Option<usize>,
    #[serde(default)]
    pub skipped: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped_duplicates: usize,
}

impl ImportOutcome {
    pub fn message(&self) -> String {
        let mut message = format!("Successfully imported {} keys", self.imported);
        if self.skipped_duplicates > 0 {
            message.push_str(&format!(
                ", {} duplicate keys skipped",
                self.skipped_duplicates
            ));
        }
        message
    }
}
