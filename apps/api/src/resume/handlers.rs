//! Axum route handlers for the Resume API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{non_blank, parse_id, ApiJson};
use crate::ml_client::JobDescriptionMatch;
use crate::models::resume::{Resume, ResumeSummary};
use crate::resume::service::{
    get_analysis, list_resumes, match_job_description, match_role, upload_resume,
};
use crate::state::AppState;

/// Multipart field carrying the resume file.
const UPLOAD_FIELD: &str = "resume";
const NOT_FOUND: &str = "Resume not found";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchJobRequest {
    pub resume_id: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchJobResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub result: JobDescriptionMatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRoleRequest {
    pub resume_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchRoleResponse {
    pub message: &'static str,
    pub result: serde_json::Value,
}

/// A body over the upload limit is reported as 413, anything else as a
/// malformed form.
fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large".to_string())
    } else {
        AppError::InvalidArgument(format!("Invalid upload: {}", err.body_text()))
    }
}

/// POST /api/resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut multipart =
        multipart.map_err(|_| AppError::InvalidArgument("No file uploaded".to_string()))?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or("resume")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(upload_error)?;
        upload = Some((filename, content));
        break;
    }

    let (filename, content) =
        upload.ok_or_else(|| AppError::InvalidArgument("No file uploaded".to_string()))?;

    let resume_id = upload_resume(
        state.resumes.as_ref(),
        state.ml.as_ref(),
        auth.user_id,
        filename,
        content,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Resume uploaded and analyzed successfully",
            resume_id,
        }),
    ))
}

/// GET /api/resume/analysis/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Resume>, AppError> {
    let resume_id = parse_id(&id, NOT_FOUND)?;
    let resume = get_analysis(state.resumes.as_ref(), auth.user_id, resume_id).await?;
    Ok(Json(resume))
}

/// GET /api/resume/list
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = list_resumes(state.resumes.as_ref(), auth.user_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// POST /api/resume/match-job
pub async fn handle_match_job(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<MatchJobRequest>,
) -> Result<Json<MatchJobResponse>, AppError> {
    let (Some(resume_id), Some(job_description)) =
        (non_blank(req.resume_id), non_blank(req.job_description))
    else {
        return Err(AppError::InvalidArgument(
            "Resume ID and job description are required".to_string(),
        ));
    };
    let resume_id = parse_id(&resume_id, NOT_FOUND)?;

    let result = match_job_description(
        state.resumes.as_ref(),
        state.ml.as_ref(),
        auth.user_id,
        resume_id,
        job_description,
    )
    .await?;

    Ok(Json(MatchJobResponse {
        message: "Job match analysis completed",
        result,
    }))
}

/// POST /api/resume/match-role
pub async fn handle_match_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<MatchRoleRequest>,
) -> Result<Json<MatchRoleResponse>, AppError> {
    let (Some(resume_id), Some(role)) = (non_blank(req.resume_id), non_blank(req.role)) else {
        return Err(AppError::InvalidArgument(
            "Resume ID and role are required".to_string(),
        ));
    };
    let resume_id = parse_id(&resume_id, NOT_FOUND)?;

    let result = match_role(
        state.resumes.as_ref(),
        state.ml.as_ref(),
        auth.user_id,
        resume_id,
        &role,
    )
    .await?;

    Ok(Json(MatchRoleResponse {
        message: "Role match completed",
        result,
    }))
}
