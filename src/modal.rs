//! Weekly report modal: a singleton subtree driven through
//! `absent → opening → ready | errored → closing → absent`. Opening awaits
//! the weekly snapshot through the cache; population defends every external
//! field at the point of use; closing fades out, waits a fixed delay, then
//! removes the element so the next activation rebuilds from scratch.

use crate::cache::ResourceCache;
use crate::curve::{self, BASELINE_PAD};
use crate::page::{Action, Element, Page};
use crate::theme::{self, Theme};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

pub const MODAL_CLASS: &str = "weekly-modal";
pub const CHART_WIDTH: f64 = 340.0;
pub const CHART_HEIGHT: f64 = 100.0;
pub const CLOSE_DELAY: Duration = Duration::from_millis(200);

const FAILURE_TEXT: &str = "加载失败，请稍后再试";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Absent,
    Opening,
    Ready,
    Errored,
    Closing,
}

#[derive(Debug)]
pub struct WeeklyModal {
    state: ModalState,
}

impl Default for WeeklyModal {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklyModal {
    pub fn new() -> Self {
        Self {
            state: ModalState::Absent,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Handles a badge activation. A surviving element from a prior cycle is
    /// re-shown as-is; otherwise the skeleton is built, flushed so the
    /// entrance transition animates, and populated once the weekly snapshot
    /// settles.
    pub async fn open(
        &mut self,
        page: &mut Page,
        cache: &ResourceCache,
        theme: &'static Theme,
        weekly_url: &str,
    ) {
        if let Some(existing) = page.by_class_mut(MODAL_CLASS) {
            // Re-show without re-fetch or state reset.
            existing.add_class("show");
            return;
        }

        self.state = ModalState::Opening;
        page.append(build_skeleton(theme));
        page.flush_layout();
        if let Some(modal) = page.by_class_mut(MODAL_CLASS) {
            modal.add_class("show");
        }

        match cache.request(weekly_url).await {
            Ok(value) => self.populate(page, theme, &value),
            Err(err) => {
                warn!("weekly snapshot unavailable: {err}");
                self.render_error(page);
            }
        }
    }

    /// Backdrop activation: fade out, wait the fixed delay, remove.
    pub async fn close(&mut self, page: &mut Page) {
        if page.by_class(MODAL_CLASS).is_none() {
            self.state = ModalState::Absent;
            return;
        }
        if let Some(modal) = page.by_class_mut(MODAL_CLASS) {
            modal.remove_class("show");
        }
        self.state = ModalState::Closing;
        sleep(CLOSE_DELAY).await;
        page.remove_by_class(MODAL_CLASS);
        self.state = ModalState::Absent;
    }

    fn populate(&mut self, page: &mut Page, theme: &'static Theme, value: &Value) {
        if page.by_class(MODAL_CLASS).is_none() {
            // Anchor removed while the load settled; nothing to mutate.
            self.state = ModalState::Absent;
            return;
        }

        let days = value["days"].as_array().cloned().unwrap_or_default();
        if days.len() < 2 {
            self.render_error(page);
            return;
        }

        if let Some(modal) = page.by_class_mut(MODAL_CLASS) {
            modal.remove_class("is-loading");
        }

        let hours: Vec<f64> = days.iter().map(|day| safe_number(&day["hours"])).collect();
        let paths = curve::curve_paths(&hours, CHART_WIDTH, CHART_HEIGHT);
        if let Some(fill) = page.by_class_mut("weekly-fill") {
            fill.set_attr("d", &paths.fill);
        }
        if let Some(line) = page.by_class_mut("weekly-line") {
            line.set_attr("d", &paths.stroke);
        }

        let ai = &value["ai"];
        let badge_color = match ai["theme_color"].as_str() {
            Some(color) if theme::is_hex_color(color) => color.trim().to_string(),
            _ => theme.colors[0].to_string(),
        };
        if let Some(badge) = page.by_class_mut("ai-badge") {
            badge.set_style("--badge-color", &badge_color);
            badge.set_text(ai["tarot"].as_str().unwrap_or(""));
        }
        if let Some(quote) = page.by_class_mut("ai-quote") {
            quote.set_text(ai["quote"].as_str().unwrap_or(""));
        }

        let stats = &value["stats"];
        set_stat(page, "stat-total", safe_number(&stats["total_hours"]));
        set_stat(page, "stat-avg", safe_number(&stats["daily_avg"]));
        set_stat(page, "stat-peak", safe_number(&stats["max_day"]["hours"]));

        self.state = ModalState::Ready;
    }

    fn render_error(&mut self, page: &mut Page) {
        if let Some(modal) = page.by_class_mut(MODAL_CLASS) {
            modal.remove_class("is-loading");
        }
        if let Some(quote) = page.by_class_mut("ai-quote") {
            quote.set_text(FAILURE_TEXT);
        }
        self.state = ModalState::Errored;
    }
}

/// Finite-or-zero coercion for externally-sourced numbers.
fn safe_number(value: &Value) -> f64 {
    value.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn set_stat(page: &mut Page, id: &str, value: f64) {
    if let Some(stat) = page.by_id_mut(id) {
        stat.set_text(&format!("{value}h"));
    }
}

fn build_skeleton(theme: &'static Theme) -> Element {
    let view_height = CHART_HEIGHT + BASELINE_PAD;

    let mut backdrop = Element::with_class("div", "modal-backdrop");
    backdrop.action = Some(Action::CloseWeekly);

    let mut ai_badge = Element::with_class("div", "ai-badge");
    ai_badge.set_style("--badge-color", theme.colors[0]);

    let gradient = Element::with_id("linearGradient", "chartGradient")
        .attr("x1", "0")
        .attr("x2", "0")
        .attr("y1", "0")
        .attr("y2", "1")
        .child(
            Element::new("stop")
                .attr("offset", "0%")
                .attr("stop-color", theme.colors[0])
                .attr("stop-opacity", "0.2"),
        )
        .child(
            Element::new("stop")
                .attr("offset", "100%")
                .attr("stop-color", theme.colors[0])
                .attr("stop-opacity", "0"),
        );

    let svg = Element::new("svg")
        .attr("viewBox", &format!("0 0 {CHART_WIDTH} {view_height}"))
        .attr("preserveAspectRatio", "none")
        .child(Element::new("defs").child(gradient))
        .child(Element::with_class("path", "weekly-fill").attr("fill", "url(#chartGradient)"))
        .child(
            Element::with_class("path", "weekly-line")
                .attr("fill", "none")
                .attr("stroke", theme.colors[0])
                .attr("stroke-width", "1.5")
                .attr("stroke-linecap", "round"),
        );

    let content = Element::with_class("div", "modal-content")
        .child(
            Element::with_class("div", "modal-header")
                .child(ai_badge)
                .child(Element::new("h2").text("SYSTEM MONITOR")),
        )
        .child(Element::with_class("div", "weekly-chart-container").child(svg))
        .child(
            Element::with_class("div", "ai-insight")
                .child(Element::with_class("p", "ai-quote").text("Loading...")),
        )
        .child(
            Element::with_class("div", "stats-grid")
                .child(stat_item("stat-total", "TOTAL"))
                .child(stat_item("stat-avg", "AVG"))
                .child(stat_item("stat-peak", "PEAK")),
        );

    let mut modal = Element::with_class("div", MODAL_CLASS)
        .child(backdrop)
        .child(content);
    modal.add_class("is-loading");
    modal
}

fn stat_item(id: &str, key: &str) -> Element {
    let mut val = Element::with_class("span", "val").text("--");
    val.id = Some(id.to_string());
    Element::with_class("div", "stat-item")
        .child(val)
        .child(Element::with_class("span", "key").text(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{LoadError, ResourceLoader};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticLoader {
        loads: AtomicUsize,
        payload: Result<Value, String>,
    }

    impl StaticLoader {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
                payload: Ok(payload),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
                payload: Err("boom".to_string()),
            })
        }
    }

    #[async_trait]
    impl ResourceLoader for StaticLoader {
        async fn load(&self, url: &str) -> Result<Value, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.payload
                .clone()
                .map_err(|reason| LoadError::new(url, reason))
        }
    }

    fn weekly_payload(theme_color: &str) -> Value {
        json!({
            "updated_at": "2026-02-09T03:16:14.951Z",
            "stats": {
                "total_hours": 31.15,
                "daily_avg": 4.45,
                "trend": "falling",
                "max_day": { "date": "2026-02-04", "hours": 7.72, "text": "7 hrs 43 mins" }
            },
            "days": [
                { "date": "2026-02-03", "hours": 6.34, "text": "6 hrs 20 mins" },
                { "date": "2026-02-04", "hours": 7.72, "text": "7 hrs 43 mins" },
                { "date": "2026-02-05", "hours": 7.62, "text": "7 hrs 36 mins" },
                { "date": "2026-02-06", "hours": 7.57, "text": "7 hrs 33 mins" },
                { "date": "2026-02-07", "hours": 0, "text": "0 secs" },
                { "date": "2026-02-08", "hours": 0, "text": "0 secs" },
                { "date": "2026-02-09", "hours": 1.9, "text": "1 hr 54 mins" }
            ],
            "ai": {
                "title": "能量流失",
                "quote": "代码就像夜色，越写越暗。",
                "tarot": "🕳️ The Hermit",
                "theme_color": theme_color
            }
        })
    }

    #[tokio::test]
    async fn open_populates_chart_stats_and_blurb() {
        let loader = StaticLoader::ok(weekly_payload("#00FFF7"));
        let cache = ResourceCache::new(loader);
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;

        assert_eq!(modal.state(), ModalState::Ready);
        let line = page.by_class("weekly-line").unwrap();
        assert!(line.attrs["d"].starts_with("M 0,"));
        let fill = page.by_class("weekly-fill").unwrap();
        assert!(fill.attrs["d"].ends_with("Z"));
        assert_eq!(
            page.by_class("ai-badge").unwrap().styles["--badge-color"],
            "#00FFF7"
        );
        assert_eq!(
            page.by_class("ai-quote").unwrap().text.as_deref(),
            Some("代码就像夜色，越写越暗。")
        );
        assert_eq!(page.by_id("stat-total").unwrap().text.as_deref(), Some("31.15h"));
        assert_eq!(page.by_id("stat-avg").unwrap().text.as_deref(), Some("4.45h"));
        assert_eq!(page.by_id("stat-peak").unwrap().text.as_deref(), Some("7.72h"));
        assert!(!page.by_class(MODAL_CLASS).unwrap().has_class("is-loading"));
    }

    #[tokio::test]
    async fn invalid_color_falls_back_to_first_accent() {
        let loader = StaticLoader::ok(weekly_payload("blue"));
        let cache = ResourceCache::new(loader);
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;

        assert_eq!(modal.state(), ModalState::Ready);
        assert_eq!(
            page.by_class("ai-badge").unwrap().styles["--badge-color"],
            theme::FOCUSED.colors[0]
        );
    }

    #[tokio::test]
    async fn short_series_errors_without_rendering_a_curve() {
        let mut payload = weekly_payload("#00FFF7");
        payload["days"] = json!([{ "date": "2026-02-09", "hours": 1.9, "text": "1 hr 54 mins" }]);
        let loader = StaticLoader::ok(payload);
        let cache = ResourceCache::new(loader);
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::REST, "weekly.json?v=1").await;

        assert_eq!(modal.state(), ModalState::Errored);
        assert_eq!(
            page.by_class("ai-quote").unwrap().text.as_deref(),
            Some(FAILURE_TEXT)
        );
        // Curve renderer untouched: the path elements still carry no data.
        assert!(!page.by_class("weekly-line").unwrap().attrs.contains_key("d"));
        assert!(!page.by_class("weekly-fill").unwrap().attrs.contains_key("d"));
        assert_eq!(page.by_id("stat-total").unwrap().text.as_deref(), Some("--"));
    }

    #[tokio::test]
    async fn load_failure_shows_fixed_message() {
        let loader = StaticLoader::failing();
        let cache = ResourceCache::new(loader);
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::REST, "weekly.json?v=1").await;

        assert_eq!(modal.state(), ModalState::Errored);
        assert_eq!(
            page.by_class("ai-quote").unwrap().text.as_deref(),
            Some(FAILURE_TEXT)
        );
    }

    #[tokio::test]
    async fn non_finite_and_missing_stats_coerce_to_zero() {
        let mut payload = weekly_payload("#00FFF7");
        payload["stats"]["total_hours"] = json!("lots");
        payload["stats"].as_object_mut().unwrap().remove("daily_avg");
        let loader = StaticLoader::ok(payload);
        let cache = ResourceCache::new(loader);
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::REST, "weekly.json?v=1").await;

        assert_eq!(modal.state(), ModalState::Ready);
        assert_eq!(page.by_id("stat-total").unwrap().text.as_deref(), Some("0h"));
        assert_eq!(page.by_id("stat-avg").unwrap().text.as_deref(), Some("0h"));
    }

    #[tokio::test]
    async fn reopen_after_close_rebuilds_and_restarts_entrance() {
        let loader = StaticLoader::ok(weekly_payload("#00FFF7"));
        let cache = ResourceCache::new(loader.clone());
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;
        assert_eq!(page.layout_flushes(), 1);

        modal.close(&mut page).await;
        assert_eq!(modal.state(), ModalState::Absent);
        assert!(page.by_class(MODAL_CLASS).is_none());

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;
        assert_eq!(modal.state(), ModalState::Ready);
        assert_eq!(page.layout_flushes(), 2);
        assert!(page.by_class(MODAL_CLASS).unwrap().has_class("show"));
        // Cache settled during the first cycle; the rebuild re-populates
        // from it without a second load.
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reactivation_while_ready_only_reshows() {
        let loader = StaticLoader::ok(weekly_payload("#00FFF7"));
        let cache = ResourceCache::new(loader.clone());
        let mut page = Page::new();
        let mut modal = WeeklyModal::new();

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;
        page.by_class_mut(MODAL_CLASS).unwrap().remove_class("show");

        modal.open(&mut page, &cache, &theme::FOCUSED, "weekly.json?v=1").await;
        assert_eq!(modal.state(), ModalState::Ready);
        assert_eq!(page.count(|el| el.has_class(MODAL_CLASS)), 1);
        assert!(page.by_class(MODAL_CLASS).unwrap().has_class("show"));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(page.layout_flushes(), 1);
    }
}
