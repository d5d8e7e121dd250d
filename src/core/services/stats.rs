//! Usage statistics service

use chrono::{Duration, NaiveDate};

use super::gateway::{Gateway, RequestOptions};
use crate::core::models::{SeriesPoint, StatsSummary, UsageStats};

pub const STATS_PATH: &str = "/api/stats";

const DAILY_WINDOW: i64 = 7;
const TREND_WINDOW: usize = 30;
const KEYS_SERIES_MAX: usize = 8;

pub struct StatsService;

impl StatsService {
    pub async fn load(gateway: &Gateway) -> Option<UsageStats> {
        gateway.fetch(STATS_PATH, RequestOptions::get()).await
    }
}

/// Shape raw stats into dashboard numbers as of `today`
pub fn summarize(stats: &UsageStats, today: NaiveDate) -> StatsSummary {
    let total = stats.total_requests;
    let successful = stats.successful_requests;
    let success_rate = if total > 0 {
        ((successful as f64 / total as f64) * 100.0).round() as u64
    } else {
        0
    };

    StatsSummary {
        total_requests: total,
        successful_requests: successful,
        failed_requests: total.saturating_sub(successful),
        success_rate,
        today_requests: stats
            .daily_usage
            .get(&day_key(today))
            .copied()
            .unwrap_or(0),
        daily_series: daily_series(stats, today),
        trend_series: trend_series(stats),
        keys_series: keys_series(stats),
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` -> `MM-DD`
fn short_label(date: &str) -> String {
    date.get(5..).unwrap_or(date).to_string()
}

fn daily_series(stats: &UsageStats, today: NaiveDate) -> Vec<SeriesPoint> {
    (0..DAILY_WINDOW)
        .rev()
        .map(|offset| {
            let key = day_key(today - Duration::days(offset));
            SeriesPoint {
                label: short_label(&key),
                value: stats.daily_usage.get(&key).copied().unwrap_or(0),
            }
        })
        .collect()
}

fn trend_series(stats: &UsageStats) -> Vec<SeriesPoint> {
    // BTreeMap keys are ISO dates, so iteration order is chronological
    let skip = stats.daily_usage.len().saturating_sub(TREND_WINDOW);
    stats
        .daily_usage
        .iter()
        .skip(skip)
        .map(|(date, value)| SeriesPoint {
            label: short_label(date),
            value: *value,
        })
        .collect()
}

fn keys_series(stats: &UsageStats) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = stats
        .keys_usage
        .iter()
        .map(|(name, value)| SeriesPoint {
            label: name.clone(),
            value: *value,
        })
        .collect();
    points.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));

    if points.len() > KEYS_SERIES_MAX {
        let others: u64 = points[KEYS_SERIES_MAX - 1..].iter().map(|p| p.value).sum();
        points.truncate(KEYS_SERIES_MAX - 1);
        points.push(SeriesPoint {
            label: "Others".to_string(),
            value: others,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
    }

    #[test]
    fn test_rate_and_failed_count() {
        let stats = UsageStats {
            total_requests: 3,
            successful_requests: 2,
            ..Default::default()
        };
        let summary = summarize(&stats, today());
        assert_eq!(summary.success_rate, 67);
        assert_eq!(summary.failed_requests, 1);
    }

    #[test]
    fn test_no_requests_means_zero_rate() {
        let summary = summarize(&UsageStats::default(), today());
        assert_eq!(summary.success_rate, 0);
        assert_eq!(summary.today_requests, 0);
        assert!(summary.keys_series.is_empty());
    }

    #[test]
    fn test_daily_series_spans_month_boundary() {
        let mut daily_usage = BTreeMap::new();
        daily_usage.insert("2024-02-26".to_string(), 4);
        daily_usage.insert("2024-03-02".to_string(), 9);
        daily_usage.insert("2024-02-01".to_string(), 100);
        let stats = UsageStats {
            daily_usage,
            ..Default::default()
        };

        let summary = summarize(&stats, today());
        let labels: Vec<&str> = summary.daily_series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["02-25", "02-26", "02-27", "02-28", "02-29", "03-01", "03-02"]
        );
        let values: Vec<u64> = summary.daily_series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 4, 0, 0, 0, 0, 9]);
        assert_eq!(summary.today_requests, 9);
        assert_eq!(summary.trend_series.len(), 3);
        assert_eq!(summary.trend_series[0].label, "02-01");
    }

    #[test]
    fn test_trend_keeps_last_30_days() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let daily_usage = (0..40)
            .map(|i| (day_key(start + Duration::days(i)), i as u64))
            .collect();
        let stats = UsageStats {
            daily_usage,
            ..Default::default()
        };
        let trend = summarize(&stats, today()).trend_series;
        assert_eq!(trend.len(), 30);
        assert_eq!(trend[0].value, 10);
        assert_eq!(trend[29].value, 39);
    }

    #[test]
    fn test_keys_series_folds_tail_into_others() {
        let keys_usage = (1..=10u64).map(|i| (format!("key-{:02}", i), i)).collect();
        let stats = UsageStats {
            keys_usage,
            ..Default::default()
        };
        let series = summarize(&stats, today()).keys_series;
        assert_eq!(series.len(), 8);
        assert_eq!(series[0].label, "key-10");
        assert_eq!(series[6].label, "key-04");
        assert_eq!(series[7].label, "Others");
        assert_eq!(series[7].value, 1 + 2 + 3);
    }

    #[test]
    fn test_keys_series_with_eight_keys_is_untouched() {
        let keys_usage = (1..=8u64).map(|i| (format!("key-{}", i), i)).collect();
        let stats = UsageStats {
            keys_usage,
            ..Default::default()
        };
        let series = summarize(&stats, today()).keys_series;
        assert_eq!(series.len(), 8);
        assert!(series.iter().all(|p| p.label != "Others"));
    }
}
