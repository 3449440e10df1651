//! Service- and HTTP-level error types.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{clients::ProviderError, quiz::QuizVariant};

/// Errors raised by the quiz engine and its collaborators.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Request shape or content did not pass validation.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The daily play ceiling for a variant has been reached.
    #[error("daily limit reached for {variant}")]
    QuotaExceeded {
        /// Variant whose quota ran out.
        variant: QuizVariant,
        /// Committed usage count at the time of the rejection.
        usage: u32,
        /// Configured daily ceiling.
        limit: u32,
    },
    /// No qualifying movie, franchise, or fact source was found.
    #[error("no content available: {0}")]
    ContentUnavailable(String),
    /// The referenced quiz session is unknown, expired, or already completed.
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// The generator kept replying in an unexpected format after all retries.
    #[error("malformed generator output: {0}")]
    MalformedOutput(String),
    /// Transport-level failure from an external collaborator.
    #[error("upstream provider error")]
    Provider(#[from] ProviderError),
    /// Caller is not allowed to perform an administrative operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Daily quota exhausted for a quiz variant.
    #[error("daily limit reached for {variant}")]
    TooManyPlays {
        /// Variant whose quota ran out.
        variant: QuizVariant,
        /// Committed usage count.
        current_usage: u32,
        /// Configured daily ceiling.
        limit: u32,
    },
    /// Internal server error; the message stays short and generic.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::Validation(message) => AppError::BadRequest(message),
            QuizError::QuotaExceeded {
                variant,
                usage,
                limit,
            } => AppError::TooManyPlays {
                variant,
                current_usage: usage,
                limit,
            },
            QuizError::ContentUnavailable(message) => AppError::NotFound(message),
            QuizError::SessionNotFound(message) => AppError::NotFound(message),
            QuizError::MalformedOutput(_) => {
                AppError::Internal("generator replied in an unexpected format".into())
            }
            QuizError::Provider(_) => AppError::Internal("upstream provider error".into()),
            QuizError::Unauthorized(message) => AppError::Unauthorized(message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct QuotaBody {
    message: String,
    variant: QuizVariant,
    current_usage: u32,
    limit: u32,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Quota rejections carry the usage numbers so clients can display them.
        if let AppError::TooManyPlays {
            variant,
            current_usage,
            limit,
        } = self
        {
            let payload = Json(QuotaBody {
                message: format!("daily limit reached for {variant}"),
                variant,
                current_usage,
                limit,
            });
            return (StatusCode::TOO_MANY_REQUESTS, payload).into_response();
        }

        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyPlays { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
