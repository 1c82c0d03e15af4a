//! Refresh token store
//!
//! Issues, validates, revokes, and rotates the long-lived session
//! credential. Plaintext tokens are 32 random bytes, URL-safe base64;
//! only their SHA-256 hash is persisted, so a database leak does not
//! leak usable credentials.
//!
//! Rotation goes through [`RefreshTokenStore::replace`] and nothing
//! else: one stored-procedure call that revokes the old row and inserts
//! the new one in the same transaction, conditioned on the old row still
//! being valid. Revoke-then-issue as two statements would open a window
//! where a concurrent refresh mints two valid tokens from one.

use super::models::{IssuedRefreshToken, RefreshTokenRecord};
use crate::db::{ProcValue, ProcedureCall, TxExecutor};
use async_trait::async_trait;
use aula_core::{AulaError, Result};
use base64::Engine;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The one message for missing, revoked, and expired tokens alike; the
/// caller must not learn which condition it hit.
const TOKEN_NOT_FOUND: &str = "refresh token";

/// Typed access to refresh-token persistence.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Mint and persist a new token for the user.
    async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken>;

    /// Fetch a token that is neither revoked nor expired.
    ///
    /// Missing, revoked, and expired are deliberately indistinguishable:
    /// all three return the same `NotFound`-class error.
    async fn get_valid(&self, token: &str) -> Result<RefreshTokenRecord>;

    /// Revoke one token (logout of a single session).
    async fn revoke(&self, token: &str) -> Result<()>;

    /// Revoke every live token for a user (full logout).
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<()>;

    /// Atomically revoke `old_token` and issue its replacement.
    ///
    /// Exactly one of two concurrent calls on the same old token may
    /// succeed; the other must fail as if the token did not exist.
    async fn replace(&self, old_token: &str, user_id: Uuid) -> Result<IssuedRefreshToken>;
}

/// Generate an opaque refresh token value.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// PostgreSQL-backed refresh token store.
pub struct PgRefreshTokenStore {
    executor: TxExecutor,
    refresh_ttl_days: i64,
}

impl PgRefreshTokenStore {
    pub fn new(executor: TxExecutor, refresh_ttl_days: i64) -> Self {
        Self {
            executor,
            refresh_ttl_days,
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn issue(&self, user_id: Uuid) -> Result<IssuedRefreshToken> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(self.refresh_ttl_days);

        let call = ProcedureCall::new("auth.issue_refresh_token")
            .param(Uuid::new_v4())
            .param(user_id)
            .param(hash_token(&token))
            .param(expires_at);

        self.executor.execute(call).await?.into_result()?;

        Ok(IssuedRefreshToken {
            token,
            user_id,
            expires_at,
        })
    }

    async fn get_valid(&self, token: &str) -> Result<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT id, user_id, token_hash, issued_at, expires_at, revoked_at \
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(hash_token(token))
        .fetch_optional(self.executor.pool())
        .await
        .map_err(|e| AulaError::Connection(e.to_string()))?;

        match record {
            Some(record) if record.is_valid() => Ok(record),
            _ => Err(AulaError::NotFound(TOKEN_NOT_FOUND.to_string())),
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let call = ProcedureCall::new("auth.revoke_refresh_token").param(hash_token(token));
        self.executor.execute(call).await?.into_result()?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<()> {
        let call = ProcedureCall::new("auth.revoke_user_refresh_tokens")
            .param(user_id)
            .param(ProcValue::Bool(true));
        self.executor.execute(call).await?.into_result()?;
        Ok(())
    }

    async fn replace(&self, old_token: &str, user_id: Uuid) -> Result<IssuedRefreshToken> {
        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(self.refresh_ttl_days);

        // The procedure updates the old row WHERE it is still valid and
        // owned by the user, then inserts the replacement; the row lock
        // gives the required exclusivity between concurrent rotations.
        let call = ProcedureCall::new("auth.replace_refresh_token")
            .param(hash_token(old_token))
            .param(Uuid::new_v4())
            .param(hash_token(&token))
            .param(user_id)
            .param(expires_at);

        self.executor
            .execute(call)
            .await?
            .into_result()
            // The losing side of a rotation race sees the same error as
            // a token that never existed.
            .map_err(|e| match e {
                AulaError::NotFound(_) => AulaError::NotFound(TOKEN_NOT_FOUND.to_string()),
                other => other,
            })?;

        Ok(IssuedRefreshToken {
            token,
            user_id,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes, URL-safe base64 without padding
        assert_eq!(a.len(), 43);
        assert!(!a.contains('='));
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let token = "some-opaque-token";
        let h1 = hash_token(token);
        let h2 = hash_token(token);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(h1, hash_token("other-token"));
    }
}
