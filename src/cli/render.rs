//! Plain-text rendering of command outcomes

use chrono::{Local, TimeZone};

use sora_admin::commands::{DashboardView, Outcome, StatusReport};
use sora_admin::core::models::{
    ApiKeyRecord, ImportPreview, SeriesPoint, ServerConfig, StatsSummary,
};
use sora_admin::core::services::import::mask_key;
use sora_admin::core::services::Page;
use sora_admin::core::traits::{Notice, NoticeLevel};

pub fn notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    eprintln!("[{}] {}", tag, notice.message);
}

pub fn outcome(outcome: &Outcome) {
    match outcome {
        Outcome::LoggedIn {
            admin,
            expires_at_ms,
        } => println!("Logged in as {} until {}", admin, format_ms(*expires_at_ms)),
        Outcome::LoginFailed { message } => println!("Login failed: {}", message),
        Outcome::LoggedOut => println!("Logged out"),
        Outcome::Status(report) => status(report),
        Outcome::Dashboard(view) => dashboard(view),
        Outcome::Keys(page) => key_page(page),
        Outcome::Key(record) => key_detail(record),
        Outcome::KeySaved(_) => println!("Key saved"),
        Outcome::KeyDeleted { id } => println!("Deleted {}", id),
        Outcome::KeyTested { passed } => {
            println!("{}", if *passed { "Key works" } else { "Key failed" })
        }
        Outcome::Batch(response) => {
            for (id, result) in &response.results {
                println!("{:<36} {}", id, result);
            }
        }
        Outcome::ImportPreview(preview) => import_preview(preview),
        Outcome::Imported(outcome) => println!("{}", outcome.message()),
        Outcome::Config(config) => server_config(config),
        Outcome::ConfigSaved(_) => println!("Configuration saved"),
        Outcome::Stats(summary) => stats(summary),
        Outcome::SessionExpired => println!("Session expired. Please log in again"),
        Outcome::Abandoned => {}
    }
}

fn format_ms(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

fn format_secs(secs: Option<f64>) -> String {
    secs.map(|s| format_ms((s * 1000.0) as i64))
        .unwrap_or_else(|| "-".to_string())
}

fn status(report: &StatusReport) {
    println!("Backend:  {}", report.base_url);
    println!("State:    {:?}", report.state);
    if let Some(admin) = &report.admin {
        println!("Admin:    {}", admin);
    }
    if let (Some(expires), Some(remaining)) = (report.expires_at_ms, report.remaining_secs) {
        println!(
            "Expires:  {} ({}m {}s left)",
            format_ms(expires),
            remaining / 60,
            remaining % 60
        );
    }
}

fn dashboard(view: &DashboardView) {
    println!("Keys: {} total, {} enabled", view.keys.total, view.keys.enabled);
    match &view.stats {
        Some(summary) => {
            println!(
                "Requests today: {}   success rate: {}%",
                summary.today_requests, summary.success_rate
            );
            series("Last 7 days", &summary.daily_series);
        }
        None => println!("Usage statistics unavailable"),
    }
    println!();
    println!("Recently added:");
    for key in &view.recent_keys {
        println!(
            "  {:<24} {:<16} {}",
            key.name,
            mask_key(&key.key),
            format_secs(key.created_at)
        );
    }
}

fn key_page(page: &Page<ApiKeyRecord>) {
    if page.items.is_empty() {
        println!("No keys");
        return;
    }
    println!(
        "{:<36} {:<20} {:<16} {:>6} {:>6}  {}",
        "ID", "NAME", "KEY", "WEIGHT", "RPM", "STATUS"
    );
    for key in &page.items {
        let status = key.status();
        let label = match status.remaining_text() {
            Some(remaining) => format!("{} ({})", status.label(), remaining),
            None => status.label().to_string(),
        };
        println!(
            "{:<36} {:<20} {:<16} {:>6} {:>6}  {}",
            key.id,
            key.name,
            mask_key(&key.key),
            key.weight,
            key.max_rpm,
            label
        );
    }
    println!(
        "Page {}/{} ({} keys)",
        page.page, page.total_pages, page.total_items
    );
}

fn key_detail(key: &ApiKeyRecord) {
    let status = key.status();
    println!("ID:         {}", key.id);
    println!("Name:       {}", key.name);
    println!("Key:        {}", mask_key(&key.key));
    println!("Weight:     {}", key.weight);
    println!("Rate limit: {}/min", key.max_rpm);
    println!("Status:     {}", status.label());
    if let Some(until) = &key.temp_disabled_until_formatted {
        println!("Disabled until: {}", until);
    }
    if let Some(remaining) = status.remaining_text() {
        println!("            {}", remaining);
    }
    println!("Created:    {}", format_secs(key.created_at));
    println!("Last used:  {}", format_secs(key.last_used));
    if let Some(notes) = key.notes.as_deref().filter(|n| !n.is_empty()) {
        println!("Notes:      {}", notes);
    }
}

pub fn import_preview(preview: &ImportPreview) {
    println!("{}", preview.summary());
    for candidate in preview.visible() {
        println!(
            "  {:<24} {:<16} weight {:<3} {}/min {}",
            candidate.name,
            mask_key(&candidate.key),
            candidate.weight,
            candidate.rate_limit,
            if candidate.enabled { "" } else { "(disabled)" }
        );
    }
    if preview.hidden_count() > 0 {
        println!("  ... and {} more", preview.hidden_count());
    }
    for skipped in &preview.skipped {
        println!("  skipped line {}: {}", skipped.line, skipped.reason);
    }
}

fn server_config(config: &ServerConfig) {
    println!("Host:               {}:{}", config.host, config.port);
    println!("Base URL:           {}", config.base_url);
    println!("Proxy host:         {}", config.proxy_host);
    println!("Proxy port:         {}", config.proxy_port);
    println!("Proxy user:         {}", config.proxy_user);
    println!(
        "Proxy password:     {}",
        if config.has_proxy_password() {
            "set"
        } else {
            "not set"
        }
    );
    println!("Image localization: {}", config.image_localization);
    println!("Image save dir:     {}", config.image_save_dir_or_default());
    println!("API auth token:     {}", config.api_auth_token);
}

fn stats(summary: &StatsSummary) {
    println!("Total requests:      {}", summary.total_requests);
    println!("Successful requests: {}", summary.successful_requests);
    println!("Failed requests:     {}", summary.failed_requests);
    println!("Success rate:        {}%", summary.success_rate);
    println!("Today:               {}", summary.today_requests);
    series("Last 7 days", &summary.daily_series);
    series("Trend", &summary.trend_series);
    series("Requests by key", &summary.keys_series);
}

fn series(title: &str, points: &[SeriesPoint]) {
    if points.is_empty() {
        return;
    }
    println!("{}:", title);
    let max = points.iter().map(|p| p.value).max().unwrap_or(0).max(1);
    for point in points {
        let width = (point.value * 40 / max) as usize;
        println!("  {:<16} {:>8} {}", point.label, point.value, "#".repeat(width));
    }
}
