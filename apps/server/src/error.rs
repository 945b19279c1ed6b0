use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finbot_ai::AiError;
use finbot_core::errors::{Error as CoreError, ValidationError};
use finbot_core::rate_limit::RateLimitDecision;
use serde::Serialize;
use thiserror::Error;

use crate::api::rate_limit::RateLimitHeaders;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{RATE_LIMIT_MESSAGE}")]
    RateLimited(RateLimitDecision),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Validation(ValidationError::InvalidInput(msg)) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CoreError::ConstraintViolation(msg) => (StatusCode::CONFLICT, msg.clone()),
        CoreError::Database(_) | CoreError::Repository(_) | CoreError::Unexpected(_) => {
            tracing::error!("Request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => core_status(e),
            ApiError::NotFound(reason) => (StatusCode::NOT_FOUND, reason.clone()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
            ApiError::ServiceUnavailable(reason) => {
                (StatusCode::SERVICE_UNAVAILABLE, reason.clone())
            }
            ApiError::RateLimited(decision) => {
                let body = Json(ErrorBody {
                    code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                    message: RATE_LIMIT_MESSAGE.to_string(),
                });
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    RateLimitHeaders(*decision),
                    body,
                )
                    .into_response();
            }
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AiError::ConversationNotFound(_) => {
                ApiError::NotFound("Conversation not found".to_string())
            }
            AiError::MissingApiKey(provider) => {
                tracing::error!("No API key configured for {}", provider);
                ApiError::ServiceUnavailable("AI service is not configured".to_string())
            }
            AiError::Core(e) => ApiError::Core(e),
            AiError::Provider(msg) | AiError::Internal(msg) => {
                tracing::error!("Chat request failed: {}", msg);
                ApiError::Internal("Failed to process chat message".to_string())
            }
        }
    }
}
