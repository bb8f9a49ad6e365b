//! Wire types exchanged with the analysis service (snake_case JSON).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::scoring::compute_score;
use crate::models::resume::AnalysisData;

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeResumeBody<'a> {
    pub resume_text: &'a str,
    pub file_name: &'a str,
    pub file_type: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobMatchBody<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub job_title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_skills: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExtractSkillsBody<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthBody {
    pub status: String,
}

/// Error body returned by the analysis service on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorBody {
    pub detail: String,
}

/// Resume analysis as produced by the service. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub skills: Option<Vec<String>>,
    pub categorized_skills: Option<BTreeMap<String, Vec<String>>>,
    pub experience_years: Option<f64>,
    pub education: Option<Vec<String>>,
    pub certifications: Option<Vec<String>>,
    pub contact_info: Option<BTreeMap<String, Value>>,
    pub summary: Option<String>,
}

impl AnalysisResult {
    pub fn skill_count(&self) -> usize {
        self.skills.as_ref().map_or(0, Vec::len)
    }

    pub fn experience_years(&self) -> f64 {
        self.experience_years.unwrap_or(0.0)
    }

    /// Converts the service output into stored enrichment, zero-filling
    /// missing fields and computing the score.
    pub fn into_analysis_data(self, analyzed_at: DateTime<Utc>) -> AnalysisData {
        let score = compute_score(self.skill_count(), self.experience_years());
        AnalysisData {
            experience_years: self.experience_years(),
            skills: self.skills.unwrap_or_default(),
            categorized_skills: self.categorized_skills.unwrap_or_default(),
            education: self.education.unwrap_or_default(),
            certifications: self.certifications.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            contact_info: self.contact_info.unwrap_or_default(),
            score,
            analyzed_at,
        }
    }
}

/// A job description to match a resume against.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub job_description: String,
    pub job_title: String,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchScore {
    pub overall_score: f64,
    pub skill_match_score: f64,
    pub experience_match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub additional_skills: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub match_score: MatchScore,
    #[serde(default)]
    pub resume_analysis: AnalysisResult,
    #[serde(default)]
    pub job_requirements: Value,
    #[serde(default)]
    pub analyzed_at: Option<String>,
}

/// Skills found in free text. The empty value doubles as the
/// "service unavailable" result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillExtraction {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub categorized: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub count: usize,
}
