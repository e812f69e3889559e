//! FIR API - PDF text extraction and FIR report generation
//!
//! Provides REST endpoints for:
//! - Text extraction from uploaded PDFs
//! - FIR report generation and download
//! - Bearer token login and a per-user audit trail (secured mode)
//!
//! The same router serves both variants; [`config::Mode`] decides which
//! routes exist and whether requests must carry a token.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;


pub use config::{AppConfig, Args, Mode};
pub use error::ApiError;
pub use state::AppState;

/// Build the router for `state.mode`
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Document endpoints; clients use both slash forms
        .route("/upload", post(handlers::upload))
        .route("/upload/", post(handlers::upload))
        .route("/generate", post(handlers::generate))
        .route("/generate/", post(handlers::generate))
        .route("/download/:filename", get(handlers::download));

    let router = match state.mode {
        Mode::Secured => router
            .route("/token", post(handlers::login))
            .route("/audit", get(handlers::audit_recent)),
        Mode::Open => router.route("/", get(handlers::root)),
    };

    router
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
