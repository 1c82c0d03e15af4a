//! Authentication and session management
//!
//! This module provides JWT-based authentication with the following components:
//! - Token issuing and validation
//! - Password hashing with Argon2
//! - Middleware for request authentication
//! - The authentication service orchestrating login, logout, and refresh
//! - Typed stores for users, roles, and refresh tokens

pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod tokens;

pub use identity::{IdentityStore, PgIdentityStore};
pub use jwt::{Claims, JwtError, SignedToken, TokenIssuer};
pub use middleware::{auth_middleware, require_role, AuthError, AuthenticatedUser};
pub use models::{IssuedRefreshToken, NewUser, PasswordCheck, RefreshTokenRecord, Role, User};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use service::{
    AuthService, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse,
};
pub use tokens::{PgRefreshTokenStore, RefreshTokenStore};
