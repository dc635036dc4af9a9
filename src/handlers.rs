use crate::badge;
use crate::errors::AppError;
use crate::models::DebugParams;
use crate::state::AppState;
use crate::storage::{DAILY_FILE, WEEKLY_FILE};
use crate::ui;
use crate::widget::Widget;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::Local;
use std::path::Path;
use tokio::fs;

/// Badge page. `?theme=...&hours=...` bypasses the snapshot with a
/// synthetic daily snapshot for manual visual QA.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<DebugParams>,
) -> Html<String> {
    let mut widget = Widget::new(state.cache.clone());
    if params.is_active() {
        widget.apply_daily(params.to_snapshot(today_string()));
    } else {
        widget.load_and_apply_daily().await;
    }
    Html(ui::page_shell(&widget))
}

/// Server-rendered weekly report: runs a full activation cycle so the
/// returned page carries the populated (or errored) modal.
pub async fn weekly_panel(
    State(state): State<AppState>,
    Query(params): Query<DebugParams>,
) -> Html<String> {
    let mut widget = Widget::new(state.cache.clone());
    if params.is_active() {
        widget.apply_daily(params.to_snapshot(today_string()));
    } else {
        widget.load_and_apply_daily().await;
    }
    widget.activate(badge::BADGE_ID).await;
    Html(ui::page_shell(&widget))
}

pub async fn api_daily(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    read_snapshot(&state.snapshot_dir.join(DAILY_FILE)).await
}

pub async fn api_weekly(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    read_snapshot(&state.snapshot_dir.join(WEEKLY_FILE)).await
}

async fn read_snapshot(path: &Path) -> Result<Json<serde_json::Value>, AppError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found("snapshot not generated yet"));
        }
        Err(err) => return Err(AppError::internal(err)),
    };
    let value = serde_json::from_slice(&bytes).map_err(AppError::internal)?;
    Ok(Json(value))
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
