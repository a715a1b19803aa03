use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// The generation endpoint plus the read-back routes, behind permissive CORS.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/generate-meme",
            post(handlers::generate_meme).fallback(handlers::method_not_allowed),
        )
        .route("/api/memes/random", get(handlers::random_meme))
        .route("/api/memes/{id}", get(handlers::get_meme))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
