//! wabridge server: session-linking HTTP API over SQLite.
//!
//! The router is built here (rather than in `main`) so integration tests
//! can drive it in-process.

pub mod confirm;
pub mod error;
pub mod routes;
pub mod storage;

use axum::{
    routing::{delete, get, post},
    Router,
};

use storage::Db;

/// Build the full API router against the given database handle.
pub fn build_router(db: Db) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Public linking flow
        .route("/link", post(routes::link::link_session))
        .route(
            "/session/{session_id}",
            get(routes::sessions::get_session).put(routes::sessions::update_session),
        )
        .route(
            "/session-status/{session_id}",
            get(routes::sessions::get_session_status),
        )
        // Admin surface
        .route("/admin/login", post(routes::admin::login))
        .route("/admin/sessions", get(routes::admin::list_sessions))
        .route(
            "/admin/sessions/{session_id}",
            delete(routes::admin::delete_session),
        )
        .route(
            "/admin/settings",
            get(routes::admin::get_settings).put(routes::admin::update_settings),
        )
        // Per-session bot settings
        .route(
            "/bot-settings/{session_id}",
            get(routes::bot_settings::get_settings).put(routes::bot_settings::update_settings),
        );

    Router::new().nest("/api", api).with_state(db)
}
