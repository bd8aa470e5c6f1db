//! Authentication API handlers
//!
//! Author: hephaex@gmail.com

use crate::audit::RequestOrigin;
use crate::auth::{Credentials, RegisteredUser, TokenResponse};
use crate::error::{AppError, AppJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use notes_core::{UserCreator, UserProvider};

/// Register a new user account
///
/// # Responses
///
/// * `201 Created` - `{"id": .., "username": ..}`
/// * `400 Bad Request` - Undecodable body, empty username or short password
/// * `409 Conflict` - Username already taken
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 201, description = "User registered successfully", body = RegisteredUser),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "User already exists", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn signup_handler<S>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    AppJson(request): AppJson<Credentials>,
) -> Result<impl IntoResponse, AppError>
where
    S: UserCreator + 'static,
{
    let user = state
        .auth
        .register(state.store.as_ref(), request, RequestOrigin::from_headers(&headers))
        .await?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in and receive a bearer token
///
/// Unknown usernames and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "auth",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid username or password", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn signin_handler<S>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    AppJson(request): AppJson<Credentials>,
) -> Result<Json<TokenResponse>, AppError>
where
    S: UserProvider + 'static,
{
    let response = state
        .auth
        .login(state.store.as_ref(), request, RequestOrigin::from_headers(&headers))
        .await?;

    Ok(Json(response))
}
