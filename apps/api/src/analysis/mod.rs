//! Client for the external resume analysis service.
//!
//! Every call is bounded by its own timeout. Failures are reported through
//! `AnalysisError` and callers treat them as "analysis unavailable"; nothing
//! here is allowed to fail a resume operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod scoring;
pub mod types;

use crate::extract::FileType;
use types::{
    AnalysisResult, AnalyzeResumeBody, ExtractSkillsBody, HealthBody, JobDescription, JobMatch,
    JobMatchBody, ServiceErrorBody, SkillExtraction,
};

pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8000";

/// Connection settings for the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub base_url: String,
    /// Full resume analysis and job matching.
    pub analyze_timeout: Duration,
    pub extract_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ANALYSIS_URL.to_string(),
            analyze_timeout: Duration::from_secs(30),
            extract_timeout: Duration::from_secs(15),
            health_timeout: Duration::from_secs(5),
        }
    }
}

impl AnalysisConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed analysis response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AnalysisError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Http(e)
        }
    }
}

/// The analysis operations the resume flows depend on.
///
/// `extract_skills` and `is_healthy` return their "unavailable" value
/// directly; the others leave that decision to the caller.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        file_name: &str,
        file_type: FileType,
    ) -> Result<AnalysisResult, AnalysisError>;

    async fn match_job(
        &self,
        resume_text: &str,
        job: &JobDescription,
    ) -> Result<JobMatch, AnalysisError>;

    async fn extract_skills(&self, text: &str) -> SkillExtraction;

    async fn is_healthy(&self) -> bool;
}

/// HTTP implementation of [`ResumeAnalyzer`].
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
        timeout: Duration,
    ) -> Result<T, AnalysisError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .timeout(timeout)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(AnalysisError::from_transport)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AnalysisError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(AnalysisError::from_transport)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ServiceErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        return Err(AnalysisError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ResumeAnalyzer for AnalysisClient {
    async fn analyze_resume(
        &self,
        resume_text: &str,
        file_name: &str,
        file_type: FileType,
    ) -> Result<AnalysisResult, AnalysisError> {
        let body = AnalyzeResumeBody {
            resume_text,
            file_name,
            file_type: file_type.as_str(),
        };
        let result: AnalysisResult = self
            .post_json("/api/analyze/resume", &[], &body, self.config.analyze_timeout)
            .await?;
        debug!(
            "Analysis returned {} skills for {file_name}",
            result.skill_count()
        );
        Ok(result)
    }

    async fn match_job(
        &self,
        resume_text: &str,
        job: &JobDescription,
    ) -> Result<JobMatch, AnalysisError> {
        let body = JobMatchBody {
            resume_text,
            job_description: &job.job_description,
            job_title: &job.job_title,
            required_skills: job.required_skills.as_deref(),
        };
        self.post_json("/api/analyze/match", &[], &body, self.config.analyze_timeout)
            .await
    }

    /// The service declares `text` as a bare parameter, which it reads from
    /// the query string; the JSON body carries it too.
    async fn extract_skills(&self, text: &str) -> SkillExtraction {
        let body = ExtractSkillsBody { text };
        match self
            .post_json(
                "/api/analyze/extract-skills",
                &[("text", text)],
                &body,
                self.config.extract_timeout,
            )
            .await
        {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Skill extraction unavailable: {e}");
                SkillExtraction::default()
            }
        }
    }

    async fn is_healthy(&self) -> bool {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(AnalysisError::from_transport);
        let health: Result<HealthBody, AnalysisError> = match response {
            Ok(r) => decode(r).await,
            Err(e) => Err(e),
        };
        match health {
            Ok(body) => body.status == "healthy",
            Err(e) => {
                debug!("Analysis service health check failed: {e}");
                false
            }
        }
    }
}
