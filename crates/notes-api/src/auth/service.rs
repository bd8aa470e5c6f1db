//! Authentication service layer
//!
//! Business logic for registration and sign-in. Storage is reached only
//! through the capability each flow needs: registration through
//! [`UserCreator`], sign-in through [`UserProvider`].

use super::jwt::TokenIssuer;
use super::password::{PasswordError, PasswordHasher};
use crate::audit::{audit_log, AuditEvent, RequestOrigin};
use crate::error::AppError;
use notes_core::{StorageError, UserCreator, UserProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Username and password, for both sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    /// At least 4 characters
    #[validate(length(min = 4, message = "Password cannot be less than 4 characters"))]
    pub password: String,
}

/// Newly registered account; never includes the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
}

/// Successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Authentication service
pub struct AuthService {
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    /// Verified against when the username is unknown, so both failure paths cost the same
    dummy_hash: String,
}

impl AuthService {
    pub fn new(hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash("dummy-password-for-unknown-users")?;
        Ok(Self {
            hasher,
            tokens,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    /// Register a new user
    ///
    /// # Returns
    ///
    /// * `Ok(RegisteredUser)` - Newly created user
    /// * `Err(AppError::Validation)` - Empty username or short password
    /// * `Err(AppError::Conflict)` - Username already taken
    pub async fn register<S>(
        &self,
        store: &S,
        request: Credentials,
        origin: RequestOrigin,
    ) -> Result<RegisteredUser, AppError>
    where
        S: UserCreator + ?Sized,
    {
        request.validate()?;

        let exists = store
            .user_exists(&request.username)
            .await
            .map_err(|e| AppError::internal("Failed to check if user exists", e))?;

        if exists {
            tracing::warn!(username = %request.username, "user already exists");
            audit_log(&AuditEvent::RegistrationFailure {
                username: request.username,
                reason: "user already exists".to_string(),
                origin,
            });
            return Err(AppError::Conflict);
        }

        let password_hash = self.hash_blocking(request.password).await?;

        // The pre-check can race with a concurrent sign-up; the unique
        // constraint still decides.
        let id = match store.create_user(&request.username, &password_hash).await {
            Ok(id) => id,
            Err(StorageError::UserAlreadyExists) => {
                audit_log(&AuditEvent::RegistrationFailure {
                    username: request.username,
                    reason: "user already exists".to_string(),
                    origin,
                });
                return Err(AppError::Conflict);
            }
            Err(e) => return Err(AppError::internal("Failed to create user", e)),
        };

        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: id,
            username: request.username.clone(),
            origin,
        });

        Ok(RegisteredUser {
            id,
            username: request.username,
        })
    }

    /// Login with username and password
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// `AppError::AuthenticationFailed`.
    pub async fn login<S>(
        &self,
        store: &S,
        request: Credentials,
        origin: RequestOrigin,
    ) -> Result<TokenResponse, AppError>
    where
        S: UserProvider + ?Sized,
    {
        request.validate()?;

        let user = match store.user_by_username(&request.username).await {
            Ok(user) => Some(user),
            Err(StorageError::UserNotFound) => None,
            Err(e) => return Err(AppError::internal("Failed to retrieve user", e)),
        };

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password_valid = self.verify_blocking(stored_hash, request.password).await?;

        let user = match user {
            Some(user) if password_valid => user,
            other => {
                let reason = if other.is_some() {
                    "password mismatch"
                } else {
                    "unknown user"
                };
                audit_log(&AuditEvent::LoginFailure {
                    username: request.username,
                    reason: reason.to_string(),
                    origin,
                });
                return Err(AppError::AuthenticationFailed);
            }
        };

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AppError::internal("Failed to generate token", e))?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            username: user.username,
            origin,
        });

        Ok(TokenResponse { token })
    }

    /// Argon2 is deliberately slow; keep it off the async workers
    async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal("Failed to hash password", e))?
            .map_err(|e| AppError::internal("Failed to hash password", e))
    }

    async fn verify_blocking(&self, hash: String, password: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::internal("Failed to verify password", e))?
            .map_err(|e| AppError::internal("Failed to verify password", e))
    }
}
