//! JWT access-token issuing and validation
//!
//! HMAC-SHA256 signed access tokens carrying subject id, a fresh `jti`,
//! and role claims - nothing else, so a decoded token leaks no PII.
//!
//! Decoding distinguishes five failure kinds internally; the HTTP layer
//! collapses all of them to one generic "invalid token" response so a
//! caller cannot probe which check failed. The refresh flow decodes with
//! lifetime validation disabled: its entire purpose is to accept an
//! access token that has already expired, provided signature, issuer,
//! and audience are intact.

use aula_core::config::AuthConfig;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Token audience
    pub aud: String,
    /// Subject - user ID
    pub sub: String,
    /// JWT ID - unique per issued token
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// One entry per role held at issue time
    pub roles: Vec<String>,
}

/// Token validation failures, reported distinctly for logging but all
/// rendered identically outward.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Invalid token audience")]
    InvalidAudience,

    #[error("Token has expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Token validation failed: {0}")]
    Other(String),

    #[error("Failed to encode JWT: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// A signed access token together with its expiry.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Builds and validates access tokens for a fixed key/issuer/audience.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl_secs: u64,
}

impl TokenIssuer {
    /// The key comes from validated configuration; an absent or empty
    /// secret has already failed startup by the time we get here.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl_secs: config.access_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Issue a signed access token for a verified identity and role set.
    ///
    /// Every call mints a fresh `jti`, so two tokens for the same user
    /// are never byte-identical.
    pub fn issue(&self, user_id: Uuid, roles: &[String]) -> Result<SignedToken, JwtError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let exp = now + self.access_ttl_secs;

        let claims = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp,
            roles: roles.to_vec(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        let expires_at = Utc
            .timestamp_opt(exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(SignedToken { token, expires_at })
    }

    /// Decode and validate a presented token.
    ///
    /// `validate_lifetime = false` skips the `exp` check only; signature,
    /// issuer, and audience are always enforced.
    pub fn decode(&self, token: &str, validate_lifetime: bool) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = validate_lifetime;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(classify_decode_error)?;

        Ok(data.claims)
    }
}

fn classify_decode_error(e: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        ErrorKind::InvalidAudience => JwtError::InvalidAudience,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => JwtError::Malformed,
        _ => JwtError::Other(e.to_string()),
    }
}
