//! Typed request/response shapes for the ML service.
//!
//! Wire payloads are decoded into `Raw*` structs first and then checked by
//! `validate()`; only validated values leave this module.

use serde::{Deserialize, Serialize};

use super::MlError;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(super) struct ClassifyRoleRequest<'a> {
    pub skills: &'a [String],
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateQuestionsRequest<'a> {
    pub role: &'a str,
    pub skills: &'a [String],
}

#[derive(Debug, Serialize)]
pub(super) struct EvaluateAnswerRequest<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct MatchJobRequest<'a> {
    pub skills: &'a [String],
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MatchJobDescriptionRequest<'a> {
    pub resume_skills: &'a [String],
    pub job_description: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResume {
    pub extracted_data: ExtractedData,
    pub analysis: ResumeAnalysis,
}

impl ParsedResume {
    pub(super) fn validate(self) -> Result<Self, MlError> {
        check_percent("analysis.score", self.analysis.score)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeRole {
    pub role: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClassification {
    pub role: String,
    pub confidence: f64,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub alternative_roles: Vec<AlternativeRole>,
}

impl RoleClassification {
    /// Classification recorded when the resume has no skills or the ML
    /// service could not classify it.
    pub fn general() -> Self {
        Self {
            role: "General".to_string(),
            confidence: 0.0,
            matched_skills: Vec::new(),
            alternative_roles: Vec::new(),
        }
    }

    pub(super) fn validate(self) -> Result<Self, MlError> {
        if self.role.trim().is_empty() {
            return Err(MlError::InvalidResponse(
                "classification returned an empty role".to_string(),
            ));
        }
        check_percent("confidence", self.confidence)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GeneratedQuestions {
    pub questions: Vec<String>,
}

impl GeneratedQuestions {
    pub(super) fn validate(self) -> Result<Vec<String>, MlError> {
        if self.questions.is_empty() {
            return Err(MlError::InvalidResponse(
                "no interview questions were generated".to_string(),
            ));
        }
        if self.questions.iter().any(|q| q.trim().is_empty()) {
            return Err(MlError::InvalidResponse(
                "generated question list contains an empty question".to_string(),
            ));
        }
        Ok(self.questions)
    }
}

/// ML judgment of a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0 – 100
    pub score: u32,
    pub feedback: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawEvaluation {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl RawEvaluation {
    pub(super) fn validate(self) -> Result<Evaluation, MlError> {
        check_percent("score", self.score)?;
        Ok(Evaluation {
            score: self.score.round() as u32,
            feedback: self.feedback,
            keywords: self.keywords,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionMatch {
    pub match_score: f64,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl JobDescriptionMatch {
    pub(super) fn validate(self) -> Result<Self, MlError> {
        check_percent("matchScore", self.match_score)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MlErrorBody {
    pub error: String,
}

fn check_percent(field: &str, value: f64) -> Result<(), MlError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(MlError::InvalidResponse(format!(
            "{field} out of range 0-100: {value}"
        )))
    }
}
