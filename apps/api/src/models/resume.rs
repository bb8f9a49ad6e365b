use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Enrichment attached to a resume once the analysis service has processed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub categorized_skills: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub contact_info: BTreeMap<String, Value>,
    /// Always within 0..=100.
    pub score: u8,
    pub analyzed_at: DateTime<Utc>,
}

/// Row shape of the `resumes` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub analysis_data: Option<Json<AnalysisData>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored resume as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub analysis_data: Option<AnalysisData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            candidate_id: row.candidate_id,
            resume_url: row.resume_url,
            storage_path: row.storage_path,
            file_name: row.file_name,
            file_size: row.file_size,
            analysis_data: row.analysis_data.map(|Json(data)| data),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields written by the upload flow; id and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub analysis_data: Option<AnalysisData>,
}
