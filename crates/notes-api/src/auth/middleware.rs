/// Authentication middleware for protecting routes
///
/// Extracts and validates the bearer token from the Authorization header.
/// On success, the caller's identity is added to the request extensions as
/// an [`AuthenticatedUser`], which handlers receive through its extractor.
use super::jwt::{JwtError, TokenIssuer};
use crate::audit::{audit_log, AuditEvent, RequestOrigin};
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;

/// Identity of the caller, valid for one request
///
/// Only the auth gate creates it; handlers take it as an argument, which
/// guarantees they run behind the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Owner id every note operation is scoped to
    pub user_id: i64,
}

/// Authentication middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),

    /// A handler asked for an identity the gate never injected
    #[error("No authenticated user on request")]
    MissingIdentity,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingAuthHeader => "Authorization header is required",
            AuthError::InvalidAuthHeader => "Invalid authorization format",
            AuthError::InvalidToken(_) | AuthError::InvalidSubject(_) => "Invalid token",
            AuthError::MissingIdentity => "Authentication required",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Unauthorized", message)),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AuthError::MissingIdentity)
    }
}

/// Pull the token out of `Bearer <token>`
///
/// Exactly one non-empty token must follow the scheme.
fn bearer_token(value: &str) -> Result<&str, AuthError> {
    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            Ok(token)
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Resolve a request's headers to an identity, or the first failure
fn authenticate(
    tokens: &TokenIssuer,
    headers: &axum::http::HeaderMap,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = bearer_token(auth_header)?;
    let subject = tokens.verify(token)?;

    let user_id = subject
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidSubject(subject))?;

    Ok(AuthenticatedUser { user_id })
}

/// Authentication middleware that requires a valid bearer token
///
/// This middleware:
/// 1. Extracts the Authorization header
/// 2. Validates the `Bearer <token>` format
/// 3. Verifies the token signature, algorithm and expiry
/// 4. Adds [`AuthenticatedUser`] to request extensions
///
/// It never touches storage.
///
/// # Usage
///
/// ```ignore
/// use axum::{Router, routing::get, middleware};
/// use notes_api::auth::middleware::auth_middleware;
///
/// let app = Router::new()
///     .route("/notes/", get(list_notes))
///     .route_layer(middleware::from_fn_with_state(tokens, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match authenticate(&tokens, request.headers()) {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AuthError::InvalidToken(_) | AuthError::InvalidSubject(_)) {
                audit_log(&AuditEvent::InvalidToken {
                    reason: e.to_string(),
                    origin: RequestOrigin::from_headers(request.headers()),
                });
            }
            return Err(e);
        }
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
