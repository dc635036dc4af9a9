//! Status badge controller. `apply` is safe to call any number of times per
//! session: the badge element is created once, its content refreshed, and
//! its activation handler rebound by replacing the element so handlers never
//! accumulate.

use crate::cache::ResourceCache;
use crate::models::DailySnapshot;
use crate::page::{Action, Element, Page};
use crate::storage;
use crate::theme::{self, Theme};
use tracing::info;

pub const BADGE_ID: &str = "wakapulse-status";

/// Renders the badge for a daily snapshot, themes the page root, and warms
/// the weekly snapshot in the background. Returns the resolved theme.
pub fn apply(page: &mut Page, cache: &ResourceCache, daily: &DailySnapshot) -> &'static Theme {
    let theme = theme::resolve(&daily.theme_name);

    page.set_root_property("--bg-gradient", theme.gradient);
    page.set_root_property("--animation-speed", theme.animation_speed);
    page.set_root_property("--glow-color", theme.glow_color);
    page.set_root_property("--glow-size", theme.glow_size);
    page.set_root_property("--pulse-speed", theme.pulse_speed);
    page.set_root_property(
        "--wakapulse-theme-color",
        theme::first_gradient_color(theme.gradient),
    );

    {
        let badge = page.get_or_create("div", BADGE_ID);
        badge.add_class("wakapulse-status");
        badge.set_style("cursor", "pointer");
        badge.set_attr("title", "点击查看本周能量报告");
        badge.children.clear();
        badge
            .children
            .push(Element::with_class("span", "wt-emoji").text(theme.emoji));
        badge.children.push(
            Element::with_class("span", "wt-text")
                .text(&format!("{} · {}h", theme.display, daily.hours)),
        );
    }

    // Drop-and-recreate so repeated applies leave exactly one handler.
    if let Some(fresh) = page.replace_with_clone(BADGE_ID) {
        fresh.action = Some(Action::OpenWeekly);
    }

    cache.prefetch(&storage::weekly_url(daily));

    info!("theme applied: {} ({}h)", theme.name, daily.hours);
    theme
}
