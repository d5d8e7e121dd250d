//! Usage statistics models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayCounts {
    pub successful: u64,
    pub failed: u64,
}

/// `GET /api/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub total_keys: u64,
    pub active_keys: u64,
    pub available_keys: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub average_response_time: f64,
    pub past_7_days: BTreeMap<String, DayCounts>,
    /// `YYYY-MM-DD` -> requests
    pub daily_usage: BTreeMap<String, u64>,
    /// key name -> requests
    pub keys_usage: BTreeMap<String, u64>,
}

/// One point of a chart series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Numbers behind the dashboard cards and charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Whole percent
    pub success_rate: u64,
    pub today_requests: u64,
    /// Last 7 days ending today
    pub daily_series: Vec<SeriesPoint>,
    /// Last 30 recorded days
    pub trend_series: Vec<SeriesPoint>,
    pub keys_series: Vec<SeriesPoint>,
}
