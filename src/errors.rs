use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("model output is not valid JSON: {0}")]
    MalformedModelOutput(String),

    #[error("field {field} has invalid value {value:?}")]
    SchemaViolation { field: String, value: String },

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("no record matches {0}")]
    RecordNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("language model error: {0}")]
    Llm(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedModelOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SchemaViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CollaboratorUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "status": "error", "message": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
