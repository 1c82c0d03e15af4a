//! API error handling
//!
//! Maps the core error taxonomy onto HTTP responses. Every body carries a
//! fixed, reviewed message per variant; raw provider text stays in the
//! server log and never reaches a client.

use aula_core::AulaError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type rendered by handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(String),
    Conflict(String),
    Unprocessable(i32),
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ApiError::new("NOT_FOUND", format!("{resource} not found")),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Unprocessable(code) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("REJECTED", format!("Operation rejected (code {code})")),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", "Internal server error"),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<AulaError> for AppError {
    fn from(err: AulaError) -> Self {
        if !err.is_client_error() {
            tracing::error!(error = %err, "request failed with server error");
        }

        match err {
            AulaError::InvalidToken => AppError::Unauthorized("Invalid token"),
            AulaError::InvalidCredentials => AppError::Unauthorized("Invalid credentials"),
            AulaError::LockedOut => AppError::Forbidden("Account is locked"),
            AulaError::NotAllowed => AppError::Forbidden("Account is not allowed to sign in"),
            AulaError::RequiresTwoFactor => {
                AppError::Forbidden("Two-factor authentication required")
            }
            AulaError::NotFound(resource) => AppError::NotFound(resource),
            AulaError::Duplicate { field } => {
                AppError::Conflict(format!("Duplicate value for {field}"))
            }
            AulaError::ConcurrencyConflict => {
                AppError::Conflict("The record was modified concurrently".to_string())
            }
            AulaError::BusinessRejection(code) => AppError::Unprocessable(code),
            AulaError::Validation(msg) => AppError::BadRequest(msg),
            // Everything else is a server fault; the body stays generic.
            AulaError::Connection(_)
            | AulaError::Transaction(_)
            | AulaError::InvalidQuery
            | AulaError::InvalidParameters
            | AulaError::OperationFailed { .. }
            | AulaError::Internal(_)
            | AulaError::Other(_) => AppError::Internal,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "unhandled error");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AulaError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_auth_failures_map_to_401() {
        assert_eq!(status_of(AulaError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AulaError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_signin_blocks_map_to_403() {
        assert_eq!(status_of(AulaError::LockedOut), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AulaError::NotAllowed), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AulaError::RequiresTwoFactor),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_conflict_family_maps_to_409() {
        assert_eq!(
            status_of(AulaError::Duplicate {
                field: "email".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AulaError::ConcurrencyConflict),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_server_faults_map_to_500_with_generic_body() {
        let response =
            AppError::from(AulaError::Connection("host unreachable".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_business_rejection_keeps_the_code() {
        assert_eq!(
            status_of(AulaError::BusinessRejection(512)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
