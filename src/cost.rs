//! Cost accounting for external API calls.
//!
//! Pure pricing math plus an append-only in-process call log. Logging a
//! call triggers a daily-budget threshold check; a breach emits a warning
//! and, when a webhook is configured, posts a JSON alert. Alerts never
//! block further calls. The log is not durable — restart loses history.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::path::Path;

use crate::config::{Config, SearchPricing};
use crate::models::{CostLogEntry, CostSummary, ModelProfile};

/// Cache-read tokens bill at this fraction of the input rate.
const CACHE_READ_DISCOUNT: f64 = 0.1;

/// Cost of one model call. Linear and additive in all token counts.
pub fn claude_cost(
    profile: &ModelProfile,
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: u64,
) -> f64 {
    let input = input_tokens as f64 / 1e6 * profile.input_cost_per_mtok;
    let output = output_tokens as f64 / 1e6 * profile.output_cost_per_mtok;
    let cache_read =
        cache_read_tokens as f64 / 1e6 * profile.input_cost_per_mtok * CACHE_READ_DISCOUNT;
    input + output + cache_read
}

/// Cost of search-service calls at the given depth tier.
pub fn search_cost(pricing: &SearchPricing, depth: &str, calls: u32) -> f64 {
    let per_call = match depth {
        "advanced" => pricing.advanced,
        _ => pricing.basic,
    };
    per_call * calls as f64
}

/// In-process call log with budget alerting. Constructed by the caller and
/// passed to request handlers; no module-level state.
pub struct CostTracker {
    entries: Vec<CostLogEntry>,
    daily_alert_threshold: f64,
    alert_webhook: Option<String>,
}

impl CostTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            entries: Vec::new(),
            daily_alert_threshold: config.budget.daily_alert_threshold,
            alert_webhook: config.budget.alert_webhook.clone(),
        }
    }

    /// Append one call record and run the daily-budget threshold check.
    pub fn log_api_call(&mut self, entry: CostLogEntry) {
        let day = entry.timestamp.date_naive();
        self.entries.push(entry);
        self.check_daily_budget(day);
    }

    pub fn entries(&self) -> &[CostLogEntry] {
        &self.entries
    }

    /// Aggregate the log over a timestamp range (inclusive start,
    /// exclusive end).
    pub fn cost_for_period(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> CostSummary {
        summarize(
            self.entries
                .iter()
                .filter(|e| e.timestamp >= from && e.timestamp < to),
        )
    }

    /// Drop entries older than the retention window.
    pub fn cleanup(&mut self, now: DateTime<Utc>, retention: Duration) {
        let cutoff = now - retention;
        let before = self.entries.len();
        self.entries.retain(|e| e.timestamp >= cutoff);
        if self.entries.len() < before {
            log::debug!(
                "cost log cleanup dropped {} entries",
                before - self.entries.len()
            );
        }
    }

    fn daily_total(&self, day: NaiveDate) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.timestamp.date_naive() == day)
            .map(|e| e.cost)
            .sum()
    }

    fn check_daily_budget(&self, day: NaiveDate) {
        let total = self.daily_total(day);
        if total <= self.daily_alert_threshold {
            return;
        }

        log::warn!(
            "daily API cost {:.4} exceeds budget threshold {:.4} ({})",
            total,
            self.daily_alert_threshold,
            day
        );

        if let Some(url) = &self.alert_webhook {
            let body = serde_json::json!({
                "alert": "daily_budget_exceeded",
                "date": day.to_string(),
                "daily_cost": total,
                "threshold": self.daily_alert_threshold,
            });
            // Fire-and-forget: a webhook failure must never block calls.
            match reqwest::blocking::Client::new().post(url).json(&body).send() {
                Ok(_) => {}
                Err(e) => log::warn!("budget alert webhook failed: {}", e),
            }
        }
    }
}

fn summarize<'a>(entries: impl Iterator<Item = &'a CostLogEntry>) -> CostSummary {
    let mut summary = CostSummary::default();

    for entry in entries {
        summary.total_cost += entry.cost;
        summary.call_count += 1;
        if entry.cache_hit {
            summary.cache_hits += 1;
        }
        *summary.by_service.entry(entry.service.clone()).or_insert(0.0) += entry.cost;
    }

    if summary.call_count > 0 {
        summary.cache_hit_rate = summary.cache_hits as f64 / summary.call_count as f64;
    }

    summary
}

/// Read a JSON-lines call log from disk, one `CostLogEntry` per line.
pub fn read_log_file(path: &Path) -> Result<Vec<CostLogEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cost log: {}", path.display()))?;

    let mut entries = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: CostLogEntry = serde_json::from_str(line)
            .with_context(|| format!("Malformed cost log entry at line {}", i + 1))?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Run the costs report command over a log file.
pub fn run_report(
    config: &Config,
    log_path: &Path,
    since: Option<String>,
    until: Option<String>,
) -> Result<()> {
    let entries = read_log_file(log_path)?;

    let from = match since {
        Some(s) => parse_date(&s)?.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        None => DateTime::<Utc>::MIN_UTC,
    };
    let to = match until {
        Some(s) => (parse_date(&s)? + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc(),
        None => DateTime::<Utc>::MAX_UTC,
    };

    let summary = summarize(
        entries
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp < to),
    );

    println!("wikigraph — API Cost Report");
    println!("===========================");
    println!();
    println!("  Calls:          {}", summary.call_count);
    println!("  Total cost:     {:.4}", summary.total_cost);
    println!(
        "  Cache hits:     {} ({:.0}%)",
        summary.cache_hits,
        summary.cache_hit_rate * 100.0
    );
    println!("  Monthly target: {:.2}", config.budget.monthly_target);

    if !summary.by_service.is_empty() {
        println!();
        println!("  By service:");
        for (service, cost) in &summary.by_service {
            println!("    {:<16} {:.4}", service, cost);
        }
    }

    Ok(())
}

/// Run the costs estimate command: price a hypothetical call.
pub fn run_estimate(
    config: &Config,
    profile_name: &str,
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: u64,
) -> Result<()> {
    let profile = match profile_name {
        "fast" => &config.routing.fast,
        "quality" => &config.routing.quality,
        other => anyhow::bail!("Unknown profile: {}. Use fast or quality.", other),
    };

    let cost = claude_cost(profile, input_tokens, output_tokens, cache_read_tokens);
    println!("Profile: {}", profile.id);
    println!("Cost:    {:.6}", cost);

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}
