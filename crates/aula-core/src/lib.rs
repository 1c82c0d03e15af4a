//! Aula Core - shared error taxonomy and configuration
//!
//! This crate defines the abstractions used throughout the Aula backend:
//! - The error taxonomy every layer reports expected failures through
//! - Configuration management (environment variables and TOML files)
//!
//! Lower layers never panic or throw for expected conditions; they return
//! a tagged [`AulaError`] and only truly unanticipated faults are converted
//! to [`AulaError::Internal`] at the nearest boundary.

pub mod config;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, ServerConfig};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error taxonomy for Aula operations.
///
/// Each variant is an expected, classified condition. The HTTP layer maps
/// variants to fixed, reviewed messages; raw provider text is carried only
/// in `Internal`/`OperationFailed` metadata and is never echoed outward.
#[derive(Error, Debug)]
pub enum AulaError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Invalid procedure reference")]
    InvalidQuery,

    #[error("Invalid procedure parameters")]
    InvalidParameters,

    /// The stored procedure completed but reported a business rejection.
    /// Carries the raw numeric status code from the output slot.
    #[error("Business rule rejected the operation (code {0})")]
    BusinessRejection(i32),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate value for a unique field (status code 100).
    #[error("Duplicate value for unique field: {field}")]
    Duplicate { field: String },

    /// Optimistic concurrency mismatch (status code 200).
    #[error("Concurrent modification detected")]
    ConcurrencyConflict,

    /// All token-validation failures collapse to this variant outward.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is locked out")]
    LockedOut,

    #[error("Account is not allowed to sign in")]
    NotAllowed,

    #[error("Two-factor authentication required")]
    RequiresTwoFactor,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider reported codes we do not recognize. The raw messages are
    /// kept as metadata for logging, never shown to clients.
    #[error("Operation failed")]
    OperationFailed { details: Vec<String> },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AulaError>;

impl AulaError {
    /// True for the variants that stem from a failed client request rather
    /// than a fault inside the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery
                | Self::InvalidParameters
                | Self::BusinessRejection(_)
                | Self::NotFound(_)
                | Self::Duplicate { .. }
                | Self::ConcurrencyConflict
                | Self::InvalidToken
                | Self::InvalidCredentials
                | Self::LockedOut
                | Self::NotAllowed
                | Self::RequiresTwoFactor
                | Self::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AulaError::InvalidToken.is_client_error());
        assert!(AulaError::InvalidCredentials.is_client_error());
        assert!(AulaError::Duplicate {
            field: "email".to_string()
        }
        .is_client_error());
        assert!(AulaError::BusinessRejection(500).is_client_error());

        assert!(!AulaError::Connection("refused".to_string()).is_client_error());
        assert!(!AulaError::Internal("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_messages_do_not_leak_token_failure_kind() {
        // Whatever failed internally, the outward message is the same.
        let e = AulaError::InvalidToken;
        assert_eq!(e.to_string(), "Invalid token");
    }
}
