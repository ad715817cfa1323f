use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::ml_client::{
    AlternativeRole, ExtractedData, JobDescriptionMatch, ParsedResume, ResumeAnalysis,
    RoleClassification,
};

/// One job-description comparison, appended to the resume it was run against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchRecord {
    pub job_description: String,
    pub match_score: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobMatchRecord {
    pub fn new(job_description: String, result: &JobDescriptionMatch) -> Self {
        Self {
            job_description,
            match_score: result.match_score,
            matching_skills: result.matching_skills.clone(),
            missing_skills: result.missing_skills.clone(),
            recommendations: result.recommendations.clone(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub extracted_data: ExtractedData,
    pub analysis: ResumeAnalysis,
    pub classified_role: String,
    pub role_confidence: f64,
    pub matched_skills: Vec<String>,
    pub alternative_roles: Vec<AlternativeRole>,
    pub job_matches: Vec<JobMatchRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resume {
    pub fn new(
        user_id: Uuid,
        filename: String,
        parsed: ParsedResume,
        classification: RoleClassification,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            filename,
            extracted_data: parsed.extracted_data,
            analysis: parsed.analysis,
            classified_role: classification.role,
            role_confidence: classification.confidence,
            matched_skills: classification.matched_skills,
            alternative_roles: classification.alternative_roles,
            job_matches: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn skills(&self) -> &[String] {
        &self.extracted_data.skills
    }

    pub fn summary(&self) -> ResumeSummary {
        ResumeSummary {
            id: self.id,
            filename: self.filename.clone(),
            created_at: self.created_at,
            analysis_score: self.analysis.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub analysis_score: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub extracted_data: Json<ExtractedData>,
    pub analysis: Json<ResumeAnalysis>,
    pub classified_role: String,
    pub role_confidence: f64,
    pub matched_skills: Vec<String>,
    pub alternative_roles: Json<Vec<AlternativeRole>>,
    pub job_matches: Json<Vec<JobMatchRecord>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            filename: row.filename,
            extracted_data: row.extracted_data.0,
            analysis: row.analysis.0,
            classified_role: row.classified_role,
            role_confidence: row.role_confidence,
            matched_skills: row.matched_skills,
            alternative_roles: row.alternative_roles.0,
            job_matches: row.job_matches.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
