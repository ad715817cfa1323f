//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{parse_id, ApiJson};
use crate::interview::engine::{get_result, list_history, start_interview, submit_answer};
use crate::ml_client::Evaluation;
use crate::models::interview::{InterviewSession, InterviewSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub message: &'static str,
    pub interview_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub interview_id: Option<String>,
    pub question_index: Option<i64>,
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub message: &'static str,
    pub evaluation: Evaluation,
}

#[derive(Debug, Serialize)]
pub struct InterviewResultResponse {
    pub interview: InterviewSession,
}

#[derive(Debug, Serialize)]
pub struct InterviewHistoryResponse {
    pub interviews: Vec<InterviewSummary>,
}

const NOT_FOUND: &str = "Interview not found";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<StartInterviewRequest>,
) -> Result<(StatusCode, Json<StartInterviewResponse>), AppError> {
    let role = req.role.unwrap_or_default();
    let interview_id = start_interview(
        state.interviews.as_ref(),
        state.resumes.as_ref(),
        state.ml.as_ref(),
        auth.user_id,
        &role,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(StartInterviewResponse {
            message: "Interview started successfully",
            interview_id,
        }),
    ))
}

/// POST /api/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let interview_id = parse_id(req.interview_id.as_deref().unwrap_or_default(), NOT_FOUND)?;
    let question_index = req.question_index.ok_or_else(|| {
        AppError::InvalidArgument("Invalid question index".to_string())
    })?;

    let evaluation = submit_answer(
        state.interviews.as_ref(),
        state.ml.as_ref(),
        auth.user_id,
        interview_id,
        question_index,
        req.answer.unwrap_or_default(),
    )
    .await?;

    Ok(Json(SubmitAnswerResponse {
        message: "Answer submitted successfully",
        evaluation,
    }))
}

/// GET /api/interview/result/:id
pub async fn handle_result(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<InterviewResultResponse>, AppError> {
    let interview_id = parse_id(&id, NOT_FOUND)?;
    let interview = get_result(state.interviews.as_ref(), auth.user_id, interview_id).await?;
    Ok(Json(InterviewResultResponse { interview }))
}

/// GET /api/interview/history
pub async fn handle_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<InterviewHistoryResponse>, AppError> {
    let interviews = list_history(state.interviews.as_ref(), auth.user_id).await?;
    Ok(Json(InterviewHistoryResponse { interviews }))
}
