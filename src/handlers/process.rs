use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::auth::Owner;
use crate::models::CustomerRecord;
use crate::services::pipeline;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    status: &'static str,
    data: CustomerRecord,
}

// POST /process
pub async fn process(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(body): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    let now = state.config.local_now();
    let record = pipeline::process_transcript(&state, &owner, &body.transcript, now).await?;

    Ok(Json(ProcessResponse {
        status: "success",
        data: record,
    }))
}
