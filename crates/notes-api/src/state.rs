//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthService, JwtError, PasswordError, PasswordHasher, TokenIssuer};
use notes_core::config::AuthConfig;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors raised while assembling the state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("token issuer: {0}")]
    Token(#[from] JwtError),

    #[error("password hasher: {0}")]
    Password(#[from] PasswordError),
}

/// Application state shared across handlers
///
/// Generic over the storage backend so handlers can name only the
/// capabilities they use.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub auth: Arc<AuthService>,
    /// Server start time
    pub start_time: Instant,
}

// Derived Clone would require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            auth: Arc::clone(&self.auth),
            start_time: self.start_time,
        }
    }
}

impl<S> AppState<S> {
    pub fn new(store: S, auth: AuthService) -> Self {
        Self {
            store: Arc::new(store),
            auth: Arc::new(auth),
            start_time: Instant::now(),
        }
    }

    /// Build state from the auth section of the configuration
    pub fn from_config(
        store: S,
        config: &AuthConfig,
        hasher: PasswordHasher,
    ) -> Result<Self, StateError> {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl())?;
        let auth = AuthService::new(hasher, Arc::new(tokens))?;
        Ok(Self::new(store, auth))
    }

    /// Issuer the auth gate verifies against
    pub fn tokens(&self) -> Arc<TokenIssuer> {
        Arc::clone(self.auth.tokens())
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
