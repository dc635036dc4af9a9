//! Batch-job core: turns a raw time-tracking summary payload and an optional
//! AI blurb candidate into the two snapshots the widget consumes. The HTTP
//! calls that produce those payloads live outside this crate; here they are
//! already-fetched JSON values.

use crate::models::{AiInsight, DaySample, Trend, WeeklyStats};
use crate::theme;
use serde_json::Value;
use std::fmt;

/// Hours-to-theme thresholds, checked in order with `hours < max`.
static THEME_RULES: [(f64, &str); 6] = [
    (1.0, "rest"),
    (3.0, "relaxed"),
    (5.0, "productive"),
    (7.0, "focused"),
    (9.0, "intense"),
    (f64::INFINITY, "legendary"),
];

const TITLE_MAX: usize = 6;
const QUOTE_MAX: usize = 30;
const TAROT_MAX: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryError(pub String);

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid summary payload: {}", self.0)
    }
}

impl std::error::Error for SummaryError {}

/// Parses the tracker's raw summary shape
/// `{data:[{range:{date}, grand_total:{total_seconds, text}}]}`.
pub fn parse_days(raw: &Value) -> Result<Vec<DaySample>, SummaryError> {
    let entries = raw["data"]
        .as_array()
        .ok_or_else(|| SummaryError("missing data array".to_string()))?;

    entries
        .iter()
        .map(|entry| {
            let date = entry["range"]["date"]
                .as_str()
                .ok_or_else(|| SummaryError("day without range.date".to_string()))?;
            let seconds = entry["grand_total"]["total_seconds"].as_f64().unwrap_or(0.0);
            let text = entry["grand_total"]["text"].as_str().unwrap_or("").to_string();
            Ok(DaySample {
                date: date.to_string(),
                hours: round2(seconds / 3600.0),
                text,
            })
        })
        .collect()
}

/// Weekly aggregates. The trend splits the series asymmetrically, first 3
/// days against the rest, as the original report always has; a strictly
/// greater second half reads as rising, ties fall.
pub fn compute_stats(days: &[DaySample]) -> Result<WeeklyStats, SummaryError> {
    if days.len() < 4 {
        return Err(SummaryError(format!(
            "need at least 4 day samples, got {}",
            days.len()
        )));
    }

    let total: f64 = days.iter().map(|d| d.hours).sum();
    let avg = total / days.len() as f64;
    // Ties go to the later day.
    let max_day = days
        .iter()
        .fold(&days[0], |best, day| if day.hours >= best.hours { day } else { best });

    let first: f64 = days[..3].iter().map(|d| d.hours).sum::<f64>() / 3.0;
    let second: f64 =
        days[3..].iter().map(|d| d.hours).sum::<f64>() / (days.len() - 3) as f64;
    let trend = if second > first { Trend::Rising } else { Trend::Falling };

    Ok(WeeklyStats {
        total_hours: round2(total),
        daily_avg: round2(avg),
        trend,
        max_day: max_day.clone(),
    })
}

/// Maps daily hours to a theme name and display label. A manual override
/// wins; an unrecognized override keeps its own name as the label.
pub fn pick_theme(hours: f64, manual: Option<&str>) -> (String, String) {
    if let Some(name) = manual {
        let display = theme::ALL
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.display.to_string())
            .unwrap_or_else(|| name.to_string());
        return (name.to_string(), display);
    }

    let &(_, name) = THEME_RULES
        .iter()
        .find(|rule| hours < rule.0)
        .unwrap_or(&THEME_RULES[THEME_RULES.len() - 1]);
    let display = theme::resolve(name).display.to_string();
    (name.to_string(), display)
}

/// Fallback blurbs tiered by daily average, used verbatim when no candidate
/// exists and as the per-field backstop when one does.
pub fn fallback_insight(daily_avg: f64) -> AiInsight {
    let (title, quote, tarot, theme_color) = if daily_avg < 1.5 {
        (
            "休养生息",
            "代码写得少，Bug 自然少。这是某种程度上的绝对胜利。",
            "🛌 The Hermit (隐士)",
            "#a0c4ff",
        )
    } else if daily_avg < 4.5 {
        (
            "渐入佳境",
            "保持节奏，每一行代码都是通往赛博朋克的砖瓦。",
            "🌱 The Empress (皇后)",
            "#80ed99",
        )
    } else if daily_avg < 8.0 {
        (
            "火力全开",
            "键盘都在喊累，但你的 Commit 还在飞。",
            "⚡ The Magician (魔术师)",
            "#f5af19",
        )
    } else if daily_avg < 12.0 {
        (
            "代码永动机",
            "这周的状态像刚喝了三杯浓缩，曲线比纳斯达克还漂亮。",
            "🔥 The Chariot (战车)",
            "#8e2de2",
        )
    } else {
        (
            "赛博飞升",
            "你已经不再是在写代码，你是在编织矩阵的底层逻辑。",
            "🌟 The World (世界)",
            "#00c6ff",
        )
    };

    AiInsight {
        title: title.to_string(),
        quote: quote.to_string(),
        tarot: tarot.to_string(),
        theme_color: theme_color.to_string(),
    }
}

/// Normalizes an AI candidate against the fallback: replacement characters
/// stripped, fields truncated by code points, colors strictly validated.
pub fn normalize_insight(candidate: Option<&Value>, fallback: &AiInsight) -> AiInsight {
    let field = |name: &str| -> String {
        candidate
            .and_then(|c| c[name].as_str())
            .map(clean_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_default()
    };

    let pick = |value: String, fallback: &str, max: usize| -> String {
        let chosen = if value.is_empty() { fallback.to_string() } else { value };
        truncate_by_code_points(&chosen, max)
    };

    let theme_color = candidate
        .and_then(|c| c["theme_color"].as_str())
        .filter(|color| theme::is_hex_color(color))
        .map(|color| color.trim().to_string())
        .unwrap_or_else(|| fallback.theme_color.clone());

    AiInsight {
        title: pick(field("title"), &fallback.title, TITLE_MAX),
        quote: pick(field("quote"), &fallback.quote, QUOTE_MAX),
        tarot: pick(field("tarot"), &fallback.tarot, TAROT_MAX),
        theme_color,
    }
}

fn clean_string(input: &str) -> String {
    input.replace('\u{fffd}', "")
}

fn truncate_by_code_points(input: &str, max: usize) -> String {
    let cleaned = clean_string(input.trim());
    let cleaned = cleaned.trim();
    cleaned.chars().take(max).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
