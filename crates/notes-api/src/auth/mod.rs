//! Authentication module
//!
//! This module provides bearer-token authentication with the following components:
//! - Token issuance and verification (HS256 JWT)
//! - Password hashing with Argon2id
//! - Middleware that turns a bearer token into an [`AuthenticatedUser`]
//! - Registration and sign-in flows

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtError, TokenIssuer, DEFAULT_TTL};
pub use middleware::{auth_middleware, AuthError, AuthenticatedUser};
pub use password::{PasswordConfig, PasswordError, PasswordHasher};
pub use service::{AuthService, Credentials, RegisteredUser, TokenResponse};
