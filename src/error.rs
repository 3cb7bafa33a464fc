use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown filter field: {field}")]
    InvalidFilterField { field: String },
    #[error("Invalid value for filter field {field}: {reason}")]
    InvalidFilterValue { field: String, reason: String },
    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidFilterValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, rendered as `error` in response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidFilterField { .. } => "invalidFilterField",
            AppError::InvalidFilterValue { .. } => "invalidFilterValue",
            AppError::InvalidSortField(_) => "invalidSortField",
            AppError::BadRequest(_) => "badRequest",
            AppError::NotFound(_) => "notFound",
            AppError::Database(_) => "database",
            AppError::Serialization(_) => "serialization",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFilterField { .. }
            | AppError::InvalidFilterValue { .. }
            | AppError::InvalidSortField(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Serialization(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> (StatusCode, Json<serde_json::Value>) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        } else {
            tracing::debug!(kind = self.kind(), "{}", self);
        }

        (
            status,
            Json(json!({
                "error": self.kind(),
                "detail": self.to_string(),
                "status": status.as_u16(),
            })),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
