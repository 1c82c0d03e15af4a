//! Authentication middleware for protecting routes
//!
//! Extracts the bearer token from the Authorization header, validates it
//! with the lifetime check enforced, and adds [`AuthenticatedUser`] to
//! request extensions. Every rejection is a 401 with the same generic
//! body; the precise failure kind goes to the log only.

use super::jwt::Claims;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Authenticated user information extracted from a validated token.
///
/// Handlers extract this with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub roles: Vec<String>,
    pub jti: String,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("Admin")
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AuthError;

    /// A token whose subject is not a UUID never authenticates, however
    /// valid its signature.
    fn try_from(claims: Claims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            roles: claims.roles,
            jti: claims.jti,
        })
    }
}

/// Authentication middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuthHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Authentication middleware that requires a valid access token.
///
/// 1. Extracts the Authorization header
/// 2. Validates the Bearer token format
/// 3. Validates signature, issuer, audience, and expiry
/// 4. Adds [`AuthenticatedUser`] to request extensions
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = state.issuer.decode(token, true).map_err(|e| {
        tracing::debug!(kind = %e, "bearer token rejected");
        AuthError::InvalidToken
    })?;

    let user = AuthenticatedUser::try_from(claims)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Middleware factory for role-based access control.
///
/// Runs after [`auth_middleware`] and rejects the request unless the
/// authenticated user holds the required role. Admin always passes.
pub fn require_role(
    required_role: &'static str,
) -> impl Fn(Request<Body>, Next) -> RoleMiddlewareFuture + Clone {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let user = request
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or(AuthError::MissingAuthHeader)?
                .clone();

            if !user.is_admin() && !user.has_role(required_role) {
                tracing::warn!(
                    user_id = %user.user_id,
                    required_role,
                    "access denied"
                );
                return Err(AuthError::InsufficientPermissions);
            }

            Ok(next.run(request).await)
        })
    }
}

type RoleMiddlewareFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_sub(sub: &str) -> Claims {
        Claims {
            iss: "aula-api".to_string(),
            aud: "aula".to_string(),
            sub: sub.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: 1000,
            exp: 2000,
            roles: vec!["Staff".to_string()],
        }
    }

    #[test]
    fn test_authenticated_user_from_claims() {
        let id = Uuid::new_v4();
        let user = AuthenticatedUser::try_from(claims_with_sub(&id.to_string())).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.roles, vec!["Staff".to_string()]);
    }

    #[test]
    fn test_unparseable_subject_is_rejected() {
        let result = AuthenticatedUser::try_from(claims_with_sub("not-a-uuid"));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_role_checks() {
        let admin = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            roles: vec!["Admin".to_string()],
            jti: Uuid::new_v4().to_string(),
        };
        let staff = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            roles: vec!["Staff".to_string()],
            jti: Uuid::new_v4().to_string(),
        };

        assert!(admin.is_admin());
        assert!(!staff.is_admin());
        assert!(staff.has_role("Staff"));
        assert!(!staff.has_role("Admin"));
    }
}
