pub mod auth;
pub mod calendar;
pub mod health;
pub mod process;
pub mod records;
pub mod tasks;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/process", post(process::process))
        .route("/daily-tasks", get(tasks::daily_tasks))
        .route("/complete-task", post(tasks::complete_task))
        .route("/records", get(records::list_records))
        .route("/calendar/feed.ics", get(calendar::calendar_feed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
