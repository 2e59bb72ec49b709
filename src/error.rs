use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;
use tracing::error;

use crate::llm::UpstreamError;
use crate::store::StoreError;
use crate::token::TokenError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests. Please wait before sending another request.")]
    TooManyRequests { retry_after: Duration },

    #[error("Failed to get response from the language model")]
    Upstream(#[from] UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("Invalid input: {}", rejection.body_text()))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => {
                AppError::Unauthorized("Invalid token".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // detail stays in the log, the client gets the short message;
        // upstream failures are logged by the proxy handler
        let message = match &self {
            AppError::Internal(e) => {
                error!("internal error: {e}");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let mut response =
            (status, Json(serde_json::json!({ "error": message }))).into_response();

        if let AppError::TooManyRequests { retry_after } = self {
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                AppError::TooManyRequests {
                    retry_after: Duration::from_secs(3),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::Upstream(UpstreamError::Malformed("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn retry_after_rounds_up() {
        let response = AppError::TooManyRequests {
            retry_after: Duration::from_millis(2500),
        }
        .into_response();
        assert_eq!(response.headers()[RETRY_AFTER], "3");
    }

    #[test]
    fn expired_and_invalid_tokens_look_the_same() {
        let expired: AppError = TokenError::Expired.into();
        let invalid: AppError = TokenError::Invalid.into();
        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(expired.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
