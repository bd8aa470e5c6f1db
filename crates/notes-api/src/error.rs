//! API error handling
//!
//! Every error reaches the client as a single-key JSON object mapping a
//! short category to a human-readable message, e.g.
//! `{"NotFound": "Note not found"}`. Internal failures are logged in full
//! and surfaced only by category.
//!
//! Author: hephaex@gmail.com

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notes_core::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// API error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(example = json!({"NotFound": "Note not found"}))]
pub struct ApiError(HashMap<String, String>);

impl ApiError {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self(HashMap::from([(category.into(), message.into())]))
    }

    pub fn category(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Body could not be decoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Body decoded but a field is semantically invalid
    #[error("validation failed: {0}")]
    Validation(String),

    /// Path id is not an integer
    #[error("id must be an integer")]
    InvalidId,

    /// Sign-in failed; the cause is deliberately not disclosed
    #[error("invalid username or password")]
    AuthenticationFailed,

    /// Username already taken; the username is deliberately not echoed
    #[error("user already exists")]
    Conflict,

    #[error("{0}")]
    NotFound(&'static str),

    /// Storage, hashing or signing fault
    #[error("{context}: {detail}")]
    Internal {
        context: &'static str,
        detail: String,
    },
}

impl AppError {
    pub fn internal(context: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Internal {
            context,
            detail: err.to_string(),
        }
    }

    /// Adapter for `map_err` on storage calls
    ///
    /// A missing row and a row owned by someone else are both reported as
    /// not found; driver faults become internal errors under `context`.
    pub fn storage(context: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |err| match err {
            StorageError::NoteNotFound | StorageError::NoRowsAffected { .. } => {
                AppError::NotFound("Note not found")
            }
            StorageError::UserNotFound => AppError::NotFound("User not found"),
            StorageError::UserAlreadyExists => AppError::Conflict,
            err @ StorageError::Database { .. } => AppError::internal(context, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation(_) | AppError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::InvalidRequest(msg) => ApiError::new("InvalidRequest", msg),
            AppError::Validation(msg) => ApiError::new("ValidationError", msg),
            AppError::InvalidId => ApiError::new("InvalidID", "ID must be an integer"),
            AppError::AuthenticationFailed => {
                ApiError::new("AuthenticationError", "Invalid username or password")
            }
            AppError::Conflict => ApiError::new("UserExists", "User already exists"),
            AppError::NotFound(msg) => ApiError::new("NotFound", msg),
            AppError::Internal { context, detail } => {
                tracing::error!(context, error = %detail, "internal error");
                ApiError::new("InternalError", context)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::InvalidRequest(format!(
            "Failed to decode request body: {}",
            rejection.body_text()
        ))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut problems: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        problems.sort();

        AppError::Validation(problems.join("; "))
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}
