//! In-memory collaborators for exercising resume flows without Postgres,
//! S3 or the analysis service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::analysis::types::{AnalysisResult, JobDescription, JobMatch, MatchScore, SkillExtraction};
use crate::analysis::{AnalysisError, ResumeAnalyzer};
use crate::extract::{ExtractError, FileType, TextExtractor};
use crate::models::resume::{AnalysisData, NewResume, ResumeRecord};
use crate::resumes::repository::{ResumeStore, StoreError};
use crate::resumes::service::ResumeService;
use crate::storage::{ObjectStore, StorageError, StoredObject};

/// Five skills and three years of experience.
pub fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        skills: Some(
            ["rust", "postgresql", "docker", "aws", "leadership"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        experience_years: Some(3.0),
        summary: Some("3+ years of experience".to_string()),
        ..AnalysisResult::default()
    }
}

#[derive(Default)]
pub struct MemoryResumeStore {
    rows: Mutex<Vec<ResumeRecord>>,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
    fail_writes: AtomicBool,
}

impl MemoryResumeStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "connection reset by peer".to_string(),
            )));
        }
        Ok(())
    }

    /// Strictly increasing timestamps so ordering is deterministic.
    fn stamp(&self) -> DateTime<Utc> {
        let mut last = self.last_stamp.lock().unwrap();
        let now = Utc::now();
        let next = match *last {
            Some(prev) if prev >= now => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRecord, StoreError> {
        self.check_writable()?;
        let now = self.stamp();
        let record = ResumeRecord {
            id: Uuid::new_v4(),
            candidate_id: resume.candidate_id,
            resume_url: resume.resume_url,
            storage_path: resume.storage_path,
            file_name: resume.file_name,
            file_size: resume.file_size,
            analysis_data: resume.analysis_data,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<ResumeRecord>, StoreError> {
        let mut rows: Vec<ResumeRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.candidate_id == candidate_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_owned(
        &self,
        id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.candidate_id == candidate_id)
            .cloned())
    }

    async fn update_analysis(
        &self,
        id: Uuid,
        candidate_id: Uuid,
        analysis: Option<AnalysisData>,
    ) -> Result<ResumeRecord, StoreError> {
        self.check_writable()?;
        let now = self.stamp();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id && r.candidate_id == candidate_id)
            .ok_or(StoreError::NotFound)?;
        row.analysis_data = analysis;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_owned(&self, id: Uuid, candidate_id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.candidate_id == candidate_id));
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
    deleted: Mutex<Vec<String>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryObjectStore {
    pub fn insert_raw(&self, key: &str, data: Bytes) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Upload {
                key: key.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        let size = data.len() as i64;
        self.insert_raw(key, data);
        Ok(StoredObject {
            public_url: format!("http://minio.test/resumes/{key}"),
            storage_path: key.to_string(),
            size,
        })
    }

    async fn get(&self, storage_path: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_path)
            .cloned()
            .ok_or_else(|| StorageError::Download {
                key: storage_path.to_string(),
                message: "NoSuchKey".to_string(),
            })
    }

    async fn delete(&self, storage_path: &str) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push(storage_path.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete {
                key: storage_path.to_string(),
                message: "bucket unavailable".to_string(),
            });
        }
        self.objects.lock().unwrap().remove(storage_path);
        Ok(())
    }
}

/// Analyzer returning a canned result, or timing out when unavailable.
pub struct StubAnalyzer {
    result: Option<AnalysisResult>,
    delay: Option<StdDuration>,
    last_text: Mutex<Option<String>>,
}

impl StubAnalyzer {
    pub fn available(result: AnalysisResult) -> Self {
        Self {
            result: Some(result),
            delay: None,
            last_text: Mutex::new(None),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            result: None,
            delay: None,
            last_text: Mutex::new(None),
        }
    }

    /// Answers `analyze_resume` only after `delay`.
    pub fn slow(result: AnalysisResult, delay: StdDuration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::available(result)
        }
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }

    fn respond(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        *self.last_text.lock().unwrap() = Some(text.to_string());
        self.result.clone().ok_or(AnalysisError::Timeout)
    }
}

#[async_trait]
impl ResumeAnalyzer for StubAnalyzer {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        _file_name: &str,
        _file_type: FileType,
    ) -> Result<AnalysisResult, AnalysisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.respond(resume_text)
    }

    async fn match_job(
        &self,
        resume_text: &str,
        job: &JobDescription,
    ) -> Result<JobMatch, AnalysisError> {
        let analysis = self.respond(resume_text)?;
        Ok(JobMatch {
            match_score: MatchScore {
                overall_score: 75.0,
                ..MatchScore::default()
            },
            resume_analysis: analysis,
            job_requirements: json!({ "title": job.job_title }),
            analyzed_at: None,
        })
    }

    async fn extract_skills(&self, text: &str) -> SkillExtraction {
        match self.respond(text) {
            Ok(analysis) => {
                let skills = analysis.skills.unwrap_or_default();
                SkillExtraction {
                    count: skills.len(),
                    skills,
                    categorized: Default::default(),
                }
            }
            Err(_) => SkillExtraction::default(),
        }
    }

    async fn is_healthy(&self) -> bool {
        self.result.is_some()
    }
}

/// Extractor returning fixed text, or failing.
pub struct StubExtractor {
    text: Option<String>,
}

impl StubExtractor {
    pub fn ok() -> Self {
        Self {
            text: Some("extracted resume text".to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, _data: Bytes, _file_type: FileType) -> Result<String, ExtractError> {
        self.text.clone().ok_or(ExtractError::Empty)
    }
}

/// A `ResumeService` wired to in-memory collaborators, with handles kept
/// for inspection.
pub struct Harness {
    pub service: ResumeService,
    pub records: Arc<MemoryResumeStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub analyzer: Arc<StubAnalyzer>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            Arc::new(MemoryResumeStore::default()),
            Arc::new(MemoryObjectStore::default()),
            Arc::new(StubAnalyzer::available(sample_analysis())),
        )
    }

    pub fn with(
        records: Arc<MemoryResumeStore>,
        objects: Arc<MemoryObjectStore>,
        analyzer: Arc<StubAnalyzer>,
    ) -> Self {
        Self::with_extractor(records, objects, analyzer, Arc::new(StubExtractor::ok()))
    }

    pub fn with_extractor(
        records: Arc<MemoryResumeStore>,
        objects: Arc<MemoryObjectStore>,
        analyzer: Arc<StubAnalyzer>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let service = ResumeService::new(
            records.clone(),
            objects.clone(),
            analyzer.clone(),
            extractor,
        );
        Self {
            service,
            records,
            objects,
            analyzer,
        }
    }
}
