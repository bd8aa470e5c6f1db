//! OpenAPI document
//!
//! Generated from the `#[utoipa::path]` annotations on the handlers and
//! served as JSON at `/api-docs/openapi.json`.
//!
//! Author: hephaex@gmail.com

use crate::auth::{Credentials, RegisteredUser, TokenResponse};
use crate::error::ApiError;
use crate::handlers::{
    self,
    health::{HealthResponse, ReadinessResponse},
    notes::{CreatedNote, NoteRequest},
};
use axum::Json;
use notes_core::Note;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notes API",
        description = "Multi-user notes service. Each user sees only their own notes; \
                       listing notes for a user who has none returns 404."
    ),
    paths(
        handlers::auth::signup_handler,
        handlers::auth::signin_handler,
        handlers::notes::list_notes,
        handlers::notes::get_note,
        handlers::notes::create_note,
        handlers::notes::update_note,
        handlers::notes::delete_note,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        Credentials,
        RegisteredUser,
        TokenResponse,
        Note,
        NoteRequest,
        CreatedNote,
        ApiError,
        HealthResponse,
        ReadinessResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Sign-up and sign-in"),
        (name = "notes", description = "Owner-scoped note CRUD"),
        (name = "health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the note endpoints
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
