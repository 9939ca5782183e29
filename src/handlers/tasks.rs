use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::auth::Owner;
use crate::models::{CustomerRecord, DailyTask};
use crate::services::pipeline::{self, CompletionTarget};
use crate::state::AppState;

// GET /daily-tasks
pub async fn daily_tasks(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<DailyTask>>, AppError> {
    let now = state.config.local_now();
    let tasks = pipeline::daily_tasks(&state, &owner, now).await?;
    Ok(Json(tasks))
}

// POST /complete-task
#[derive(Deserialize)]
pub struct CompleteTaskRequest {
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub task_text: String,
}

#[derive(Serialize)]
pub struct CompleteTaskResponse {
    status: &'static str,
    data: CustomerRecord,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(body): Json<CompleteTaskRequest>,
) -> Result<Json<CompleteTaskResponse>, AppError> {
    let target = CompletionTarget {
        phone: non_blank(body.phone),
        customer_name: non_blank(body.customer_name),
    };
    let now = state.config.local_now();
    let record = pipeline::complete_task(&state, &owner, &target, &body.task_text, now).await?;

    Ok(Json(CompleteTaskResponse {
        status: "success",
        data: record,
    }))
}
