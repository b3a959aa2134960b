use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::CoreError;
use serde::Serialize;

use crate::auth::jwt::UNAUTHORIZED_MESSAGE;

#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, forged or expired token. Always the same message.
    Unauthorized,
    InvalidCredentials,
    BadRequest(String),
    NotFound(String),
    RateLimited(String),
    /// A downstream provider (mail, media host) failed.
    Upstream(String),
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::RateLimited(msg) => msg,
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                "Upstream service unavailable, please try again later".to_string()
            }
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{e:#}"))
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound { .. } => AppError::NotFound(e.to_string()),
            CoreError::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}
