//! Activity report backend.
//!
//! Authenticates users against an external identity provider and turns a
//! list of activities into a bounded-length report via an external text
//! generator, with a local composer as fallback.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
mod handlers;
pub mod report;

use auth::AuthProvider;
use report::ReportService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub reports: Arc<ReportService>,
}

/// Build the API router. CORS is left to the caller.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/verify-token", get(auth::verify_token))
        .route("/reports", post(handlers::create_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        // Auth routes
        .route("/auth/get-token", post(auth::get_token))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/auth/create-account", post(auth::create_account))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
