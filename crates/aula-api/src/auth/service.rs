//! Authentication orchestration
//!
//! Sequences the identity store, refresh token store, and token issuer
//! into the login, logout, refresh, and registration flows. Each flow is
//! a straight-line state machine with terminal outcomes only; no
//! intermediate state is persisted.
//!
//! Outward error shaping happens here: the refresh flow collapses every
//! failure - unknown token, bad access-token, subject mismatch, lost
//! rotation race - into the same [`AulaError::InvalidToken`] so a caller
//! cannot learn which check failed.

use super::identity::IdentityStore;
use super::jwt::TokenIssuer;
use super::models::{NewUser, PasswordCheck, User};
use super::password::{hash_password, validate_password_strength};
use super::tokens::RefreshTokenStore;
use aula_core::{AulaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role granted when registration names none.
const DEFAULT_ROLE: &str = "Staff";

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub email: String,
}

/// Token refresh request: the expired access token and the live refresh
/// token travel together.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role names to bind; every name must already exist.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Authentication service
pub struct AuthService {
    identity: Arc<dyn IdentityStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    issuer: TokenIssuer,
    password_min_len: usize,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        issuer: TokenIssuer,
        password_min_len: usize,
    ) -> Self {
        Self {
            identity,
            tokens,
            issuer,
            password_min_len,
        }
    }

    /// Login: verify credentials, load roles, issue both tokens.
    ///
    /// A persistence failure while issuing the refresh token after a
    /// good password check propagates as an error; login never reports
    /// success without a refresh token.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let user = self
            .identity
            .find_by_email(&request.email)
            .await?
            .ok_or(AulaError::InvalidCredentials)?;

        match self.identity.check_password(&user, &request.password).await? {
            PasswordCheck::Success => {}
            PasswordCheck::Invalid => return Err(AulaError::InvalidCredentials),
            PasswordCheck::LockedOut => return Err(AulaError::LockedOut),
            PasswordCheck::NotAllowed => return Err(AulaError::NotAllowed),
            PasswordCheck::RequiresTwoFactor => return Err(AulaError::RequiresTwoFactor),
        }

        let roles = self.identity.roles_for_user(user.id).await?;

        let access = self
            .issuer
            .issue(user.id, &roles)
            .map_err(|e| AulaError::Internal(format!("access token issue: {e}")))?;

        let refresh = self.tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(LoginResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_at: access.expires_at,
            user_id: user.id,
            email: user.email,
        })
    }

    /// Logout: revoke every refresh token of the authenticated subject.
    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        self.tokens.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, "logout: all refresh tokens revoked");
        Ok(())
    }

    /// Refresh: rotate the refresh token and mint a new access token.
    ///
    /// The presented access token may be expired; signature, issuer, and
    /// audience are still enforced. Its subject must own the refresh
    /// token - a mismatch looks exactly like an invalid token.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<RefreshResponse> {
        let record = self
            .tokens
            .get_valid(&request.refresh_token)
            .await
            .map_err(hide_as_invalid_token)?;

        let claims = self
            .issuer
            .decode(&request.access_token, false)
            .map_err(|e| {
                tracing::debug!(kind = %e, "refresh: access token rejected");
                AulaError::InvalidToken
            })?;

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| AulaError::InvalidToken)?;

        let user = self
            .identity
            .find_by_id(subject)
            .await?
            .ok_or(AulaError::InvalidToken)?;

        if user.id != record.user_id {
            tracing::warn!(user_id = %user.id, "refresh: token owner mismatch");
            return Err(AulaError::InvalidToken);
        }

        let roles = self.identity.roles_for_user(user.id).await?;

        let access = self
            .issuer
            .issue(user.id, &roles)
            .map_err(|e| AulaError::Internal(format!("access token issue: {e}")))?;

        let rotated = self
            .tokens
            .replace(&request.refresh_token, user.id)
            .await
            .map_err(hide_as_invalid_token)?;

        Ok(RefreshResponse {
            access_token: access.token,
            refresh_token: rotated.token,
            expires_at: access.expires_at,
        })
    }

    /// Load the profile of an authenticated subject.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User> {
        self.identity
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AulaError::NotFound("user".to_string()))
    }

    /// List user accounts, newest first.
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        self.identity.list_users(limit, offset).await
    }

    /// Delete a user account together with its role bindings.
    ///
    /// Deleting an absent user is a `NotFound` error, not a success.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.identity.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    /// Register a new account with its role bindings, all or nothing.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse> {
        if !request.email.contains('@') {
            return Err(AulaError::Validation("Invalid email format".to_string()));
        }
        if request.username.trim().is_empty() {
            return Err(AulaError::Validation("Username is required".to_string()));
        }

        validate_password_strength(&request.password, self.password_min_len)
            .map_err(AulaError::Validation)?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| AulaError::Internal(format!("password hashing: {e}")))?;

        let roles = if request.roles.is_empty() {
            vec![DEFAULT_ROLE.to_string()]
        } else {
            request.roles
        };

        let user = self
            .identity
            .create_user(
                NewUser {
                    username: request.username,
                    email: request.email,
                    phone: request.phone,
                },
                password_hash,
                roles,
            )
            .await?;

        tracing::info!(user_id = %user.id, "user registered");

        Ok(RegisterResponse {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}

/// Expected store failures during refresh collapse to the one outward
/// token error; infrastructure faults keep their class.
fn hide_as_invalid_token(e: AulaError) -> AulaError {
    match e {
        AulaError::NotFound(_)
        | AulaError::BusinessRejection(_)
        | AulaError::ConcurrencyConflict => AulaError::InvalidToken,
        other => other,
    }
}
