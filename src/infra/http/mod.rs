//! HTTP delivery layer: maps requests onto the synchronization surface.

pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};

use state::HttpState;

/// Build the public API router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::posts::list).post(handlers::posts::create),
        )
        .route("/api/posts/recent", get(handlers::posts::recent))
        .route(
            "/api/posts/{slug}",
            get(handlers::posts::detail)
                .put(handlers::posts::update)
                .delete(handlers::posts::delete),
        )
        .route(
            "/api/posts/{slug}/comments",
            get(handlers::comments::list).post(handlers::comments::create),
        )
        .route("/api/categories", get(handlers::site::categories))
        .route("/api/stats", get(handlers::site::stats))
        .route("/api/resync", post(handlers::site::resync))
        .with_state(state)
}
