//! One producer pass: consume the raw tracker summary and the optional AI
//! blurb candidate, compute the weekly stats and today's theme, and write
//! `daily.json` + `weekly.json` into the snapshot dir. The upstream fetches
//! happen outside; payloads arrive through env vars or files.

use chrono::{Duration, Local, Utc};
use serde_json::Value;
use std::{env, error::Error};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use wakapulse::models::{DailySnapshot, WeeklySnapshot};
use wakapulse::producer;
use wakapulse::storage::{self, DAILY_FILE, WEEKLY_FILE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let raw = read_summary().await?;
    let days = producer::parse_days(&raw)?;
    let stats = producer::compute_stats(&days)?;

    let yesterday = (Local::now().date_naive() - Duration::days(1)).to_string();
    let daily_hours = match env::var("MANUAL_HOURS").ok() {
        Some(manual) => manual.parse::<f64>().ok().filter(|h| h.is_finite()).unwrap_or(0.0),
        None => days
            .iter()
            .find(|d| d.date == yesterday)
            .map(|d| d.hours)
            .unwrap_or(0.0),
    };

    let manual_theme = env::var("MANUAL_THEME").ok();
    let (theme_name, theme_display) = producer::pick_theme(daily_hours, manual_theme.as_deref());

    let candidate = read_ai_candidate();
    let fallback = producer::fallback_insight(stats.daily_avg);
    let ai = producer::normalize_insight(candidate.as_ref(), &fallback);

    let now = Utc::now().to_rfc3339();
    let daily = DailySnapshot {
        date: yesterday,
        hours: daily_hours,
        theme_name,
        theme_display,
        updated_at: now.clone(),
    };
    let weekly = WeeklySnapshot {
        updated_at: now,
        stats,
        days,
        ai,
    };

    let dir = storage::resolve_snapshot_dir();
    storage::write_snapshot(&dir.join(DAILY_FILE), &daily)
        .await
        .map_err(|err| err.message)?;
    storage::write_snapshot(&dir.join(WEEKLY_FILE), &weekly)
        .await
        .map_err(|err| err.message)?;

    info!(
        "snapshots written to {} ({}h yesterday, theme {})",
        dir.display(),
        daily.hours,
        daily.theme_name
    );
    Ok(())
}

/// Raw summary payload: `SUMMARY_RAW_JSON` inline, or `SUMMARY_FILE` on disk.
async fn read_summary() -> Result<Value, Box<dyn Error>> {
    if let Ok(raw) = env::var("SUMMARY_RAW_JSON") {
        return Ok(serde_json::from_str(&raw)?);
    }
    if let Ok(path) = env::var("SUMMARY_FILE") {
        let bytes = tokio::fs::read(&path).await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }
    Err("SUMMARY_RAW_JSON or SUMMARY_FILE is required".into())
}

/// Optional AI blurb candidate; anything unparseable just means fallback.
fn read_ai_candidate() -> Option<Value> {
    let raw = env::var("AI_RESULT_JSON").ok()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring unparseable AI candidate: {err}");
            None
        }
    }
}
