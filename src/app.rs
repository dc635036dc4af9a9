use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/weekly", get(handlers::weekly_panel))
        .route("/api/daily", get(handlers::api_daily))
        .route("/api/weekly", get(handlers::api_weekly))
        .with_state(state)
}
