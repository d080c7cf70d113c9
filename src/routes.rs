// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{health, quiz_assessment},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the quiz assessment pipeline and its admin surface.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (config and quiz service).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/generate", post(quiz_assessment::generate))
        .route("/submit", post(quiz_assessment::submit))
        .route("/reinforce", post(quiz_assessment::reinforce))
        .route("/submit-reinforce", post(quiz_assessment::submit_reinforce))
        .route("/history", get(quiz_assessment::history))
        .route(
            "/{id}",
            get(quiz_assessment::get_one).delete(quiz_assessment::delete),
        );

    let admin_routes =
        Router::new().route("/quiz-assessments/{id}", delete(quiz_assessment::force_delete));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/quiz-assessments", quiz_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
