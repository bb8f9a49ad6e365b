use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::types::{JobDescription, JobMatch, SkillExtraction};
use crate::analysis::ResumeAnalyzer;
use crate::auth::Caller;
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::errors::AppError;
use crate::extract::{FileType, TextExtractor};
use crate::models::resume::{AnalysisData, ResumeRecord};
use crate::resumes::repository::{ResumeStore, StoreError};
use crate::storage::ObjectStore;

/// Resume operations over the record store, object storage and the
/// analysis service. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct ResumeService {
    pub(crate) records: Arc<dyn ResumeStore>,
    pub(crate) objects: Arc<dyn ObjectStore>,
    pub(crate) analyzer: Arc<dyn ResumeAnalyzer>,
    pub(crate) extractor: Arc<dyn TextExtractor>,
    pub(crate) max_upload_bytes: usize,
}

impl ResumeService {
    pub fn new(
        records: Arc<dyn ResumeStore>,
        objects: Arc<dyn ObjectStore>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            records,
            objects,
            analyzer,
            extractor,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// All resumes owned by the caller, most recently updated first.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<ResumeRecord>, AppError> {
        Ok(self.records.list_for_candidate(caller.id).await?)
    }

    /// Owners and reviewers may read; other candidates are refused.
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<ResumeRecord, AppError> {
        let record = self
            .records
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

        if !caller.can_read(record.candidate_id) {
            warn!("Candidate {} denied access to resume {id}", caller.id);
            return Err(AppError::Forbidden);
        }
        Ok(record)
    }

    /// Replaces the analysis of a resume owned by the caller.
    pub async fn update_analysis(
        &self,
        caller: &Caller,
        id: Uuid,
        analysis: Option<AnalysisData>,
    ) -> Result<ResumeRecord, AppError> {
        if let Some(data) = &analysis {
            if data.score > 100 {
                return Err(AppError::Validation(format!(
                    "score must be between 0 and 100, got {}",
                    data.score
                )));
            }
        }

        match self.records.update_analysis(id, caller.id, analysis).await {
            Ok(record) => Ok(record),
            Err(StoreError::NotFound) => Err(AppError::NotFound(format!("Resume {id} not found"))),
            Err(StoreError::Database(e)) => Err(AppError::StoreRejected(e.to_string())),
        }
    }

    /// Removes the record, then its stored file. A failed file cleanup is
    /// logged; the record stays deleted.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let record = self
            .records
            .find_owned(id, caller.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

        self.records.delete_owned(id, caller.id).await?;
        info!("Deleted resume {id} for candidate {}", caller.id);

        if let Err(e) = self.objects.delete(&record.storage_path).await {
            error!(
                "Resume {id} deleted but its file {} was not removed: {e}",
                record.storage_path
            );
        }
        Ok(())
    }

    /// Matches a readable resume against a job description. `None` when the
    /// text cannot be extracted or the analysis service is unavailable.
    pub async fn match_job(
        &self,
        caller: &Caller,
        id: Uuid,
        job: &JobDescription,
    ) -> Result<Option<JobMatch>, AppError> {
        if job.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "jobDescription cannot be empty".to_string(),
            ));
        }

        let record = self.get(caller, id).await?;
        let data = self.objects.get(&record.storage_path).await?;
        let file_type = FileType::from_file_name(&record.file_name);

        let text = match self.extractor.extract(data, file_type).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed for resume {id}: {e}");
                return Ok(None);
            }
        };

        match self.analyzer.match_job(&text, job).await {
            Ok(matched) => Ok(Some(matched)),
            Err(e) => {
                warn!("Job match unavailable for resume {id}: {e}");
                Ok(None)
            }
        }
    }

    pub async fn extract_skills(&self, text: &str) -> Result<SkillExtraction, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("text cannot be empty".to_string()));
        }
        Ok(self.analyzer.extract_skills(text).await)
    }

    pub async fn analysis_available(&self) -> bool {
        self.analyzer.is_healthy().await
    }
}
