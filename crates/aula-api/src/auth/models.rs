//! Database models for authentication and authorization
//!
//! Core data structures for the auth system:
//! - User: account identity and lockout bookkeeping
//! - Role: named grant referenced by name throughout orchestration
//! - RefreshTokenRecord: long-lived rotated session credential
//!
//! Role membership is deliberately not cached on [`User`]; it is looked
//! up on demand so a revoked role takes effect on the next token issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Email address (unique, also accepted for login)
    pub email: String,

    /// Hashed password (Argon2id PHC string)
    /// Never serialized in API responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Whether the account may sign in at all
    pub is_active: bool,

    /// Whether sign-in must complete a second factor
    pub two_factor_enabled: bool,

    /// Consecutive failed login attempts
    #[serde(default)]
    pub failed_login_attempts: i32,

    /// Account locked until this time (if locked)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the account is currently locked
    pub fn is_locked(&self) -> bool {
        self.locked_until
            .map(|until| Utc::now() < until)
            .unwrap_or(false)
    }
}

/// Requested fields for a new account; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Outcome of a credential check.
///
/// The identity store reports the precise condition; the orchestrator
/// decides how much of it the client gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Success,
    Invalid,
    LockedOut,
    NotAllowed,
    RequiresTwoFactor,
}

/// Named role
///
/// Roles are referenced by name, not id, throughout the orchestration
/// layer; a name must exist in the store before a user can be bound to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// Refresh token row as persisted.
///
/// Tokens are stored hashed; the plaintext value exists only in the
/// [`IssuedRefreshToken`] handed back at issue time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A token is valid iff it is neither revoked nor expired.
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}

/// A freshly minted refresh token, plaintext included.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
