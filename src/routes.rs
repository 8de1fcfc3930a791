// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{levels, results, sessions},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the assessment session engine under /api/assessment.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (database pool + config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let assessment_routes = Router::new()
        .route("/sessions", post(sessions::start_session))
        .route("/sessions/{id}/submit", post(sessions::submit_session))
        .route("/sessions/{id}/confirm-level", post(levels::confirm_user_level))
        .route("/sessions/{id}/manager-level", post(levels::set_manager_level))
        .route("/sessions/{id}/responses", get(results::session_responses))
        .route("/attempts/{user_id}/{competency_id}", get(results::attempts_info))
        .route(
            "/results/{user_id}/{competency_id}/latest",
            get(results::latest_result),
        );

    Router::new()
        .nest("/api/assessment", assessment_routes)
        // Global middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
