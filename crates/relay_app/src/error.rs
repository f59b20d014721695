use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use engine_logging::engine_error;
use relay_engine::StartError;
use serde::Serialize;

use crate::users::StoreError;

/// `{ok, message?}` acknowledgement returned by every intake endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Start(#[from] StartError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("admin key missing or wrong")]
    Unauthorized,

    #[error("user {0:?} not found")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Start(_)
            | AppError::BadRequest(_)
            | AppError::Store(StoreError::DaysOutOfRange { .. }) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(err) => {
                engine_error!("User store error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Task(err) => {
                engine_error!("User store task failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(Ack::failed(message))).into_response()
    }
}
