use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::auth::resolve_owner;
use crate::services::calendar::local::generate_feed;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub token: String,
}

/// Calendar apps subscribe by URL, so the token travels in the query string.
// GET /calendar/feed.ics?token=...
pub async fn calendar_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let owner = resolve_owner(&state, &query.token)?;

    let events = {
        let db = state
            .db
            .lock()
            .map_err(|_| AppError::CollaboratorUnavailable("database lock poisoned".to_string()))?;
        queries::get_calendar_events_for_owner(&db, &owner).map_err(|e| {
            tracing::error!(operation = "calendar_feed", owner = %owner, error = %e, "failed to load events");
            AppError::CollaboratorUnavailable(format!("calendar: {e:#}"))
        })?
    };

    let ics = generate_feed(&events, &format!("Emlak CRM - {owner}"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        ics,
    )
        .into_response())
}
