use anyhow::Result as AnyResult;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{AnalysisData, NewResume, ResumeRecord, ResumeRow};

const RESUME_COLUMNS: &str = "id, candidate_id, resume_url, storage_path, file_name, file_size, \
                              analysis_data, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The id / owner scoping matched no row.
    #[error("No matching resume")]
    NotFound,

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for resume records. Mutations are scoped by `(id, candidate_id)`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, StoreError>;

    /// Newest first by `updated_at`.
    async fn list_for_candidate(&self, candidate_id: Uuid)
        -> Result<Vec<ResumeRecord>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError>;

    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<ResumeRecord>, StoreError>;

    async fn update_analysis(
        &self,
        id: Uuid,
        candidate_id: Uuid,
        analysis: Option<AnalysisData>,
    ) -> Result<ResumeRecord, StoreError>;

    async fn delete_owned(&self, id: Uuid, candidate_id: Uuid) -> Result<(), StoreError>;
}

/// PostgreSQL implementation over the `resumes` table.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool against `database_url`.
    pub async fn connect(database_url: &str) -> AnyResult<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            r#"
            INSERT INTO resumes
                (candidate_id, resume_url, storage_path, file_name, file_size, analysis_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(resume.candidate_id)
        .bind(&resume.resume_url)
        .bind(&resume.storage_path)
        .bind(&resume.file_name)
        .bind(resume.file_size)
        .bind(resume.analysis_data.map(Json))
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted resume {} for candidate {}", row.id, row.candidate_id);
        Ok(row.into())
    }

    async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<ResumeRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE candidate_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ResumeRecord::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ResumeRecord::from))
    }

    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1 AND candidate_id = $2"
        ))
        .bind(id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ResumeRecord::from))
    }

    async fn update_analysis(
        &self,
        id: Uuid,
        candidate_id: Uuid,
        analysis: Option<AnalysisData>,
    ) -> Result<ResumeRecord, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            r#"
            UPDATE resumes
            SET analysis_data = $3, updated_at = NOW()
            WHERE id = $1 AND candidate_id = $2
            RETURNING {RESUME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(candidate_id)
        .bind(analysis.map(Json))
        .fetch_optional(&self.pool)
        .await?;
        row.map(ResumeRecord::from).ok_or(StoreError::NotFound)
    }

    async fn delete_owned(&self, id: Uuid, candidate_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND candidate_id = $2")
            .bind(id)
            .bind(candidate_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
