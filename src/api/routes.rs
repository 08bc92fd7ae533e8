//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, cleanup_topics_handler, clear_cache_handler, create_note_handler,
    create_question_handler, delete_note_handler, delete_question_handler, health_handler,
    list_questions_handler, regenerate_filters_handler, update_note_handler,
    update_progress_handler, update_question_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/questions` - Paginated, filtered question listing
/// - `POST /api/questions/progress` - Record completion status
/// - `POST /api/notes`, `PUT|DELETE /api/notes/:id` - Personal notes
/// - `POST /api/admin/questions`, `PUT|DELETE /api/admin/questions/:id` - Question catalog
/// - `GET|DELETE /api/admin/cache` - Server cache stats and flush
/// - `POST /api/admin/regenerate-filters` - Flush and rebuild the tag universe
/// - `POST /api/admin/cleanup-topics` - Rewrite stored tags cleaned, then flush
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/questions", get(list_questions_handler))
        .route("/api/questions/progress", post(update_progress_handler))
        .route("/api/notes", post(create_note_handler))
        .route(
            "/api/notes/:id",
            put(update_note_handler).delete(delete_note_handler),
        )
        .route("/api/admin/questions", post(create_question_handler))
        .route(
            "/api/admin/questions/:id",
            put(update_question_handler).delete(delete_question_handler),
        )
        .route(
            "/api/admin/cache",
            get(cache_stats_handler).delete(clear_cache_handler),
        )
        .route(
            "/api/admin/regenerate-filters",
            post(regenerate_filters_handler),
        )
        .route("/api/admin/cleanup-topics", post(cleanup_topics_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
