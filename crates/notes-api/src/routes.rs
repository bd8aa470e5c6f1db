//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::auth::auth_middleware;
use crate::handlers::{auth, notes};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use notes_core::Storage;

/// Create the auth and note routes
pub fn api_routes<S>(state: &AppState<S>) -> Router<AppState<S>>
where
    S: Storage + 'static,
{
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler::<S>))
        .route("/auth/signin", post(auth::signin_handler::<S>));

    // Protected routes (bearer token required). `route_layer` keeps unknown
    // paths answering 404 instead of 401.
    let protected_routes = Router::new()
        .route(
            "/notes",
            get(notes::list_notes::<S>).post(notes::create_note::<S>),
        )
        .route(
            "/notes/",
            get(notes::list_notes::<S>).post(notes::create_note::<S>),
        )
        .route(
            "/notes/:id",
            get(notes::get_note::<S>)
                .put(notes::update_note::<S>)
                .delete(notes::delete_note::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.tokens(),
            auth_middleware,
        ));

    // Combine routes
    Router::new().merge(public_routes).merge(protected_routes)
}
