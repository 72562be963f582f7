use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Typed failure taxonomy for the core. Every variant is terminal: nothing is
/// retried internally, callers decide what to do next.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("a connection request already exists between these users")]
    Conflict,

    #[error("cannot send a connection request to yourself")]
    SelfRequest,

    #[error("only the receiver of a request may decide it")]
    Unauthorized,

    #[error("request has already been decided")]
    AlreadyDecided,

    #[error("not found")]
    NotFound,

    #[error("upload session is expired or already consumed")]
    SessionExpired,

    #[error("object storage failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::Validation { .. } | CoreError::SelfRequest => StatusCode::BAD_REQUEST,
            CoreError::Conflict | CoreError::AlreadyDecided => StatusCode::CONFLICT,
            CoreError::Unauthorized => StatusCode::FORBIDDEN,
            CoreError::NotFound => StatusCode::NOT_FOUND,
            CoreError::SessionExpired => StatusCode::GONE,
            CoreError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => CoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => CoreError::Conflict,
            _ => CoreError::Storage(anyhow::Error::new(err)),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:#}", self);
        }
        let body = match &self {
            CoreError::Validation { field, reason } => json!({
                "error": format!("invalid {}: {}", field, reason),
                "field": field,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
