//! Session engine: one page, one cache handle, one modal. Owns the
//! activation dispatch so controllers stay free of each other.

use crate::badge;
use crate::cache::ResourceCache;
use crate::modal::{ModalState, WeeklyModal};
use crate::models::DailySnapshot;
use crate::page::{Action, Page};
use crate::storage;
use crate::theme::{self, Theme};
use tracing::warn;

pub struct Widget {
    page: Page,
    cache: ResourceCache,
    theme: &'static Theme,
    daily: Option<DailySnapshot>,
    modal: WeeklyModal,
}

impl Widget {
    pub fn new(cache: ResourceCache) -> Self {
        Self {
            page: Page::new(),
            cache,
            theme: &theme::REST,
            daily: None,
            modal: WeeklyModal::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn modal_state(&self) -> ModalState {
        self.modal.state()
    }

    /// Applies a daily snapshot directly (debug override path).
    pub fn apply_daily(&mut self, daily: DailySnapshot) {
        self.theme = badge::apply(&mut self.page, &self.cache, &daily);
        self.daily = Some(daily);
    }

    /// Loads the daily snapshot through the cache and applies it. A missing
    /// or malformed snapshot still renders the badge, on the default theme.
    pub async fn load_and_apply_daily(&mut self) {
        let snapshot = match self.cache.request(&storage::daily_url()).await {
            Ok(value) => serde_json::from_value((*value).clone()).unwrap_or_else(|err| {
                warn!("daily snapshot malformed: {err}");
                DailySnapshot::placeholder()
            }),
            Err(err) => {
                warn!("daily snapshot unavailable: {err}");
                DailySnapshot::placeholder()
            }
        };
        self.apply_daily(snapshot);
    }

    /// Dispatches an activation on the element matched by id or class.
    /// Unknown targets and elements without a bound action no-op.
    pub async fn activate(&mut self, target: &str) {
        match self.page.action_of(target) {
            Some(Action::OpenWeekly) => {
                let url = match &self.daily {
                    Some(daily) => storage::weekly_url(daily),
                    None => storage::WEEKLY_FILE.to_string(),
                };
                self.modal
                    .open(&mut self.page, &self.cache, self.theme, &url)
                    .await;
            }
            Some(Action::CloseWeekly) => self.modal.close(&mut self.page).await,
            None => {}
        }
    }

    pub fn html(&self) -> String {
        self.page.body_html()
    }
}
