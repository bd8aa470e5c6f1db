//! Note API handlers
//!
//! Every handler sits behind the auth gate and is scoped to the caller's
//! own notes. A note owned by another user is indistinguishable from one
//! that does not exist.
//!
//! Author: hephaex@gmail.com

use super::parse_id;
use crate::auth::AuthenticatedUser;
use crate::error::{AppError, AppJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use notes_core::{
    Note, NoteCreator, NoteDeleter, NoteProvider, NoteUpdater, NotesProvider, StorageError,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body for creating or replacing a note
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NoteRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Echo of a newly created note
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedNote {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// List the caller's notes in creation order
///
/// A caller with no notes gets `404` rather than an empty array.
#[utoipa::path(
    get,
    path = "/notes/",
    tag = "notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's notes", body = [Note]),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
        (status = 404, description = "Caller has no notes", body = crate::error::ApiError),
    )
)]
pub async fn list_notes<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Note>>, AppError>
where
    S: NotesProvider + 'static,
{
    match state.store.notes(user.user_id).await {
        Ok(notes) => {
            tracing::debug!(user_id = user.user_id, count = notes.len(), "listed notes");
            Ok(Json(notes))
        }
        Err(StorageError::NoteNotFound) => Err(AppError::NotFound("No notes found")),
        Err(e) => Err(AppError::storage("Failed to retrieve notes")(e)),
    }
}

/// Fetch one of the caller's notes
#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "notes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = Note),
        (status = 400, description = "Id is not an integer", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
        (status = 404, description = "Note not found", body = crate::error::ApiError),
    )
)]
pub async fn get_note<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError>
where
    S: NoteProvider + 'static,
{
    let id = parse_id(&id)?;

    let note = state
        .store
        .note(id, user.user_id)
        .await
        .map_err(AppError::storage("Failed to retrieve note"))?;

    Ok(Json(note))
}

/// Create a note owned by the caller
#[utoipa::path(
    post,
    path = "/notes/",
    tag = "notes",
    security(("bearer_auth" = [])),
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created", body = CreatedNote),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
    )
)]
pub async fn create_note<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    AppJson(request): AppJson<NoteRequest>,
) -> Result<impl IntoResponse, AppError>
where
    S: NoteCreator + 'static,
{
    request.validate()?;

    let id = state
        .store
        .create_note(user.user_id, &request.title, &request.content)
        .await
        .map_err(AppError::storage("Failed to create note"))?;

    tracing::info!(user_id = user.user_id, note_id = id, "note created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedNote {
            id,
            title: request.title,
            content: request.content,
        }),
    ))
}

/// Replace the title and content of one of the caller's notes
#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "notes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    request_body = NoteRequest,
    responses(
        (status = 204, description = "Note updated"),
        (status = 400, description = "Invalid id or input", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
        (status = 404, description = "Note not found", body = crate::error::ApiError),
    )
)]
pub async fn update_note<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<NoteRequest>,
) -> Result<StatusCode, AppError>
where
    S: NoteUpdater + 'static,
{
    let id = parse_id(&id)?;
    request.validate()?;

    state
        .store
        .update_note(id, user.user_id, &request.title, &request.content)
        .await
        .map_err(AppError::storage("Failed to update note"))?;

    tracing::info!(user_id = user.user_id, note_id = id, "note updated");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete one of the caller's notes
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    tag = "notes",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 400, description = "Id is not an integer", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid token", body = crate::error::ApiError),
        (status = 404, description = "Note not found", body = crate::error::ApiError),
    )
)]
pub async fn delete_note<S>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: NoteDeleter + 'static,
{
    let id = parse_id(&id)?;

    state
        .store
        .delete_note(id, user.user_id)
        .await
        .map_err(AppError::storage("Failed to delete note"))?;

    tracing::info!(user_id = user.user_id, note_id = id, "note deleted");

    Ok(StatusCode::NO_CONTENT)
}
