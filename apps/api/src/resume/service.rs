//! Resume workflow: upload and analysis, listing, job matching.
//!
//! Upload flow: ML parse → ML classify (best effort) → persist.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ml_client::{JobDescriptionMatch, MlService, RoleClassification};
use crate::models::resume::{JobMatchRecord, Resume, ResumeSummary};
use crate::store::ResumeRepository;

fn resume_not_found() -> AppError {
    AppError::NotFound("Resume not found".to_string())
}

/// Parses and classifies an uploaded resume, stores it and returns its id.
///
/// Classification is skipped when no skills were extracted, and a failed
/// classification falls back to "General" rather than failing the upload.
pub async fn upload_resume(
    resumes: &dyn ResumeRepository,
    ml: &dyn MlService,
    user_id: Uuid,
    filename: String,
    content: Bytes,
) -> Result<Uuid, AppError> {
    if content.is_empty() {
        return Err(AppError::InvalidArgument("No file uploaded".to_string()));
    }

    let parsed = ml
        .parse_resume(&filename, content)
        .await
        .map_err(AppError::upstream("Failed to analyze resume"))?;

    let skills = &parsed.extracted_data.skills;
    let classification = if skills.is_empty() {
        RoleClassification::general()
    } else {
        match ml.classify_role(skills).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Role classification failed for user {user_id}, using General: {e}");
                RoleClassification::general()
            }
        }
    };

    let resume = Resume::new(user_id, filename, parsed, classification);
    resumes.create(&resume).await?;

    info!(
        "Analyzed resume {} for user {}: score {}, role {} ({}%)",
        resume.id, user_id, resume.analysis.score, resume.classified_role, resume.role_confidence
    );
    Ok(resume.id)
}

pub async fn get_analysis(
    resumes: &dyn ResumeRepository,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Resume, AppError> {
    resumes
        .get(resume_id, user_id)
        .await?
        .ok_or_else(resume_not_found)
}

pub async fn list_resumes(
    resumes: &dyn ResumeRepository,
    user_id: Uuid,
) -> Result<Vec<ResumeSummary>, AppError> {
    Ok(resumes
        .list_by_user(user_id)
        .await?
        .iter()
        .map(Resume::summary)
        .collect())
}

/// Compares a resume's skills against a job description and appends the
/// result to the resume's match history.
pub async fn match_job_description(
    resumes: &dyn ResumeRepository,
    ml: &dyn MlService,
    user_id: Uuid,
    resume_id: Uuid,
    job_description: String,
) -> Result<JobDescriptionMatch, AppError> {
    let resume = get_analysis(resumes, user_id, resume_id).await?;

    let result = ml
        .match_job_description(resume.skills(), &job_description)
        .await
        .map_err(AppError::upstream("Failed to match job description"))?;

    let record = JobMatchRecord::new(job_description, &result);
    resumes
        .update(
            resume_id,
            user_id,
            Box::new(move |r: &mut Resume| {
                r.job_matches.push(record);
                Ok(())
            }),
        )
        .await?
        .ok_or_else(resume_not_found)?;

    info!(
        "Matched resume {resume_id} against job description: {}%",
        result.match_score
    );
    Ok(result)
}

/// Matches a resume's skills against a named role. The ML payload is
/// returned as-is and not stored.
pub async fn match_role(
    resumes: &dyn ResumeRepository,
    ml: &dyn MlService,
    user_id: Uuid,
    resume_id: Uuid,
    role: &str,
) -> Result<serde_json::Value, AppError> {
    let role = role.trim();
    if role.is_empty() {
        return Err(AppError::InvalidArgument("Role is required".to_string()));
    }
    let resume = get_analysis(resumes, user_id, resume_id).await?;
    ml.match_job(resume.skills(), role)
        .await
        .map_err(AppError::upstream("Failed to match job"))
}
