//! Upload workflow: store the file, try to enrich it, commit the record.
//!
//! The object write always precedes the record insert, and the insert is the
//! commit point. If the insert fails, or the upload is dropped before it,
//! the object is deleted again so no stored file outlives a failed upload.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::FileType;
use crate::models::resume::{AnalysisData, NewResume, ResumeRecord};
use crate::resumes::service::ResumeService;
use crate::storage::{object_key, ObjectStore, StoredObject};

/// An uploaded object that no record points at yet. Finish it with
/// [`StagedObject::commit`] once the record exists, or
/// [`StagedObject::release`] to delete it. Dropping it unfinished (the
/// request future was cancelled) schedules the delete on the runtime.
#[must_use = "a staged object must be committed or released"]
struct StagedObject {
    store: Arc<dyn ObjectStore>,
    object: StoredObject,
    pending: bool,
}

impl StagedObject {
    fn new(store: Arc<dyn ObjectStore>, object: StoredObject) -> Self {
        Self {
            store,
            object,
            pending: true,
        }
    }

    fn object(&self) -> &StoredObject {
        &self.object
    }

    fn commit(mut self) -> StoredObject {
        self.pending = false;
        self.object.clone()
    }

    /// Best-effort delete. Failures are logged and swallowed.
    async fn release(mut self) {
        self.pending = false;
        remove_orphan(&*self.store, &self.object.storage_path).await;
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        if !self.pending {
            return;
        }
        let path = self.object.storage_path.clone();
        warn!("Upload of {path} abandoned before its record was written");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                handle.spawn(async move { remove_orphan(&*store, &path).await });
            }
            Err(_) => error!("No runtime to roll back upload {path}; object is orphaned"),
        }
    }
}

async fn remove_orphan(store: &dyn ObjectStore, storage_path: &str) {
    match store.delete(storage_path).await {
        Ok(()) => info!("Rolled back upload {storage_path}"),
        Err(e) => error!("Failed to roll back upload {storage_path}; object is orphaned: {e}"),
    }
}

/// Decodes a base64 upload, dropping a `data:...;base64,` prefix if present.
pub fn decode_resume_file(encoded: &str) -> Result<Bytes, AppError> {
    let payload = match encoded.split_once(',') {
        Some((_, rest)) => rest,
        None => encoded,
    };
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| AppError::Validation(format!("resumeFile is not valid base64: {e}")))?;
    Ok(Bytes::from(data))
}

impl ResumeService {
    /// Stores a resume for `candidate_id` and records it, attaching analysis
    /// when the analysis service can provide it.
    pub async fn upload(
        &self,
        candidate_id: Uuid,
        data: Bytes,
        file_name: &str,
    ) -> Result<ResumeRecord, AppError> {
        let file_name = file_name.trim();
        if data.is_empty() {
            return Err(AppError::Validation("Resume file is required".to_string()));
        }
        if file_name.is_empty() {
            return Err(AppError::Validation("fileName is required".to_string()));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {} bytes",
                self.max_upload_bytes
            )));
        }

        let file_type = FileType::from_file_name(file_name);
        let key = object_key(candidate_id, file_name, Utc::now());
        let stored = self
            .objects
            .put(&key, data.clone(), file_type.content_type())
            .await?;
        let staged = StagedObject::new(Arc::clone(&self.objects), stored);

        let analysis_data = self.enrich(data, file_name, file_type).await;

        let new_resume = NewResume {
            candidate_id,
            resume_url: staged.object().public_url.clone(),
            storage_path: staged.object().storage_path.clone(),
            file_name: file_name.to_string(),
            file_size: staged.object().size,
            analysis_data,
        };

        match self.records.insert(new_resume).await {
            Ok(record) => {
                let object = staged.commit();
                info!(
                    "Stored resume {} for candidate {candidate_id} at {} (analysed: {})",
                    record.id,
                    object.storage_path,
                    record.analysis_data.is_some()
                );
                Ok(record)
            }
            Err(e) => {
                error!("Resume insert failed for candidate {candidate_id}: {e}");
                staged.release().await;
                Err(e.into())
            }
        }
    }

    /// Extracts text and asks the analysis service about it. Any failure
    /// yields `None`.
    async fn enrich(
        &self,
        data: Bytes,
        file_name: &str,
        file_type: FileType,
    ) -> Option<AnalysisData> {
        let text = match self.extractor.extract(data, file_type).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed for {file_name}, skipping analysis: {e}");
                return None;
            }
        };

        match self
            .analyzer
            .analyze_resume(&text, file_name, file_type)
            .await
        {
            Ok(result) => Some(result.into_analysis_data(Utc::now())),
            Err(e) => {
                warn!("Resume analysis unavailable for {file_name}: {e}");
                None
            }
        }
    }
}
