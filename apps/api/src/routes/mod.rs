pub mod extractors;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::resumes::handlers;
use crate::state::AppState;

/// Headroom for base64 expansion and the JSON envelope around the file.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let max_upload = state.resumes.max_upload_bytes();
    let body_limit = max_upload / 3 * 4 + 4 + BODY_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/resumes",
            post(handlers::handle_upload).get(handlers::handle_list),
        )
        .route(
            "/resumes/:id",
            get(handlers::handle_get).delete(handlers::handle_delete),
        )
        .route(
            "/resumes/:id/analysis",
            put(handlers::handle_update_analysis),
        )
        .route("/resumes/:id/match", post(handlers::handle_match))
        .route("/skills/extract", post(handlers::handle_extract_skills))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
