//! API routes

mod auth;
mod health;
mod jobs;
pub mod metrics;
mod users;

use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use jobboard_auth::auth_middleware;
use rust_embed::Embed;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::{AppState, MetricsHandle};

/// Embedded static files from the frontend build
#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../static"]
struct Assets;

/// Handler for serving embedded static files
async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Try to get the exact file
    if let Some(content) = <Assets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        (
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response()
    } else if let Some(content) = <Assets as Embed>::get("index.html") {
        // SPA fallback: serve index.html for any unmatched route
        Html(content.data.into_owned()).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Login, registration, own profile
        .merge(auth::routes())
        // Admin user management
        .merge(users::routes(&state))
        // Job postings and applications
        .merge(jobs::routes(&state))
        .with_state(state.clone())
        // Token authentication runs before any role gate
        .layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .layer(CorsLayer::permissive());

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    // Serve embedded static files (SPA) - must be last to not interfere with API routes
    router.fallback(serve_embedded_file)
}
