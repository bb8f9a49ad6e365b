//! Axum route handlers for the Resume API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::types::{JobDescription, JobMatch, SkillExtraction};
use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::resume::{AnalysisData, ResumeRecord};
use crate::resumes::upload::decode_resume_file;
use crate::routes::extractors::{ApiJson, ApiPath};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub resume_file: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnalysisRequest {
    #[serde(default)]
    pub analysis_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub job_match: Option<JobMatch>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractSkillsRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /resumes
///
/// Stores a base64-encoded resume for the caller. Analysis is attached when
/// the analysis service answers; otherwise `analysisData` is null.
pub async fn handle_upload(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<UploadRequest>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let encoded = request
        .resume_file
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::Validation("resumeFile is required".to_string()))?;
    let file_name = request.file_name.unwrap_or_default();
    let data = decode_resume_file(&encoded)?;

    let record = state.resumes.upload(caller.id, data, &file_name).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /resumes
pub async fn handle_list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.resumes.list(&caller).await?))
}

/// GET /resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(state.resumes.get(&caller, id).await?))
}

/// PUT /resumes/:id/analysis
///
/// `analysisData: null` clears the analysis.
pub async fn handle_update_analysis(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateAnalysisRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let analysis = request
        .analysis_data
        .filter(|v| !v.is_null())
        .map(serde_json::from_value::<AnalysisData>)
        .transpose()
        .map_err(|e| AppError::Validation(format!("Invalid analysisData: {e}")))?;

    Ok(Json(
        state.resumes.update_analysis(&caller, id, analysis).await?,
    ))
}

/// DELETE /resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.resumes.delete(&caller, id).await?;
    Ok(Json(MessageResponse {
        message: "Resume deleted successfully".to_string(),
    }))
}

/// POST /resumes/:id/match
pub async fn handle_match(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(job): ApiJson<JobDescription>,
) -> Result<Json<MatchResponse>, AppError> {
    let job_match = state.resumes.match_job(&caller, id, &job).await?;
    Ok(Json(MatchResponse { job_match }))
}

/// POST /skills/extract
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    _caller: Caller,
    ApiJson(request): ApiJson<ExtractSkillsRequest>,
) -> Result<Json<SkillExtraction>, AppError> {
    Ok(Json(state.resumes.extract_skills(&request.text).await?))
}
