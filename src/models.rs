use serde::{Deserialize, Serialize};

/// Daily snapshot written by the producer and consumed by the badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: String,
    pub hours: f64,
    pub theme_name: String,
    pub theme_display: String,
    #[serde(default)]
    pub updated_at: String,
}

impl DailySnapshot {
    /// Fallback used when the daily snapshot never arrives; the badge still
    /// renders, on the default theme.
    pub fn placeholder() -> Self {
        Self {
            date: String::new(),
            hours: 0.0,
            theme_name: "rest".to_string(),
            theme_display: "初始化".to_string(),
            updated_at: String::new(),
        }
    }
}

/// One day of tracked time inside the weekly snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySample {
    pub date: String,
    pub hours: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_hours: f64,
    pub daily_avg: f64,
    pub trend: Trend,
    pub max_day: DaySample,
}

/// AI-generated thematic blurb attached to the weekly snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiInsight {
    pub title: String,
    pub quote: String,
    pub tarot: String,
    pub theme_color: String,
}

/// Weekly snapshot written by the producer. The widget engine deliberately
/// consumes the raw JSON value instead of this type so that a single bad
/// field degrades that field only (see `modal`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySnapshot {
    pub updated_at: String,
    pub stats: WeeklyStats,
    pub days: Vec<DaySample>,
    pub ai: AiInsight,
}

/// Query parameters for the manual-QA override: `?theme=focused&hours=6`
/// applies a synthetic daily snapshot without touching the cache.
#[derive(Debug, Default, Deserialize)]
pub struct DebugParams {
    pub theme: Option<String>,
    pub hours: Option<f64>,
}

impl DebugParams {
    pub fn is_active(&self) -> bool {
        self.theme.is_some() || self.hours.is_some()
    }

    pub fn to_snapshot(&self, date: String) -> DailySnapshot {
        let theme_name = self.theme.clone().unwrap_or_else(|| "rest".to_string());
        let theme = crate::theme::resolve(&theme_name);
        DailySnapshot {
            date,
            hours: self.hours.unwrap_or(0.0).max(0.0),
            theme_name,
            theme_display: theme.display.to_string(),
            updated_at: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_snapshot_round_trips_trend() {
        let json = serde_json::json!({
            "updated_at": "2026-02-09T03:16:14.951Z",
            "stats": {
                "total_hours": 31.15,
                "daily_avg": 4.45,
                "trend": "falling",
                "max_day": { "date": "2026-02-04", "hours": 7.72, "text": "7 hrs 43 mins" }
            },
            "days": [
                { "date": "2026-02-03", "hours": 6.34, "text": "6 hrs 20 mins" }
            ],
            "ai": {
                "title": "能量流失",
                "quote": "代码就像夜色。",
                "tarot": "🕳️ The Hermit",
                "theme_color": "#00FFF7"
            }
        });
        let snapshot: WeeklySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.stats.trend, Trend::Falling);
        assert_eq!(snapshot.days.len(), 1);
    }

    #[test]
    fn debug_params_build_synthetic_snapshot() {
        let params = DebugParams {
            theme: Some("focused".to_string()),
            hours: Some(6.0),
        };
        assert!(params.is_active());
        let snap = params.to_snapshot("2026-02-09".to_string());
        assert_eq!(snap.theme_name, "focused");
        assert_eq!(snap.theme_display, "专注日");
        assert_eq!(snap.hours, 6.0);
    }

    #[test]
    fn debug_hours_never_negative() {
        let params = DebugParams {
            theme: None,
            hours: Some(-3.0),
        };
        assert_eq!(params.to_snapshot(String::new()).hours, 0.0);
    }
}
