use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::handlers::auth::Owner;
use crate::models::CustomerRecord;
use crate::services::pipeline;
use crate::state::AppState;

// GET /records
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<CustomerRecord>>, AppError> {
    Ok(Json(pipeline::list_records(&state, &owner).await?))
}
