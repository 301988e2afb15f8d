use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers. Every variant renders as `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    Internal(&'static str),
    Input(&'static str),
    Unauthorized,
    NotFound,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::Internal(msg) | AppError::Input(msg) => msg,
            AppError::NotFound => "NOT_FOUND",
            AppError::Unauthorized => {
                "Authentication credentials were not provided or are invalid."
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

pub trait ResultExt<T> {
    /// Log the error and turn it into a 500.
    fn reject(self, msg: &'static str) -> Result<T, AppError>;
    /// Log the error and turn it into a 400.
    fn reject_input(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for Result<T, E> {
    fn reject(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e:?}");
            AppError::Internal(msg)
        })
    }

    fn reject_input(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{msg}: {e:?}");
            AppError::Input(msg)
        })
    }
}
