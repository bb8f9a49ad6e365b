use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and whether the analysis service answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let analysis_service = state.resumes.analysis_available().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "analysisService": analysis_service
    }))
}
