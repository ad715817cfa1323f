//! Interview workflow: session creation, answer submission and completion.
//!
//! Flow per session: start_interview → submit_answer × N (any order) →
//! completed once every slot holds an answer.
//!
//! ML calls always happen before anything is written, so a failed call
//! leaves the store exactly as it was.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ml_client::{Evaluation, MlService};
use crate::models::interview::{InterviewSession, InterviewSummary};
use crate::store::{InterviewRepository, ResumeRepository};

fn interview_not_found() -> AppError {
    AppError::NotFound("Interview not found".to_string())
}

/// Creates a new in-progress session for `role` and returns its id.
///
/// Questions are generated from the role plus the skills of the caller's
/// latest resume (none if the caller has no resume).
pub async fn start_interview(
    interviews: &dyn InterviewRepository,
    resumes: &dyn ResumeRepository,
    ml: &dyn MlService,
    user_id: Uuid,
    role: &str,
) -> Result<Uuid, AppError> {
    if role.trim().is_empty() {
        return Err(AppError::InvalidArgument("Role is required".to_string()));
    }

    let resume = resumes.find_latest_by_user(user_id).await?;
    let skills = resume
        .as_ref()
        .map(|r| r.skills().to_vec())
        .unwrap_or_default();

    let questions = ml
        .generate_questions(role, &skills)
        .await
        .map_err(AppError::upstream("Failed to generate interview questions"))?;

    let session = InterviewSession::new(
        user_id,
        resume.map(|r| r.id),
        role.to_string(),
        questions,
    );
    interviews.create(&session).await?;

    info!(
        "Started interview {} for user {} (role: {role}, {} questions, {} resume skills)",
        session.id,
        user_id,
        session.questions.len(),
        skills.len()
    );
    Ok(session.id)
}

/// Evaluates `answer` for slot `question_index` and records it.
///
/// The slot write, the "all answered" check and the aggregate score are one
/// repository mutation, so concurrent submissions never see a half-written
/// question list.
pub async fn submit_answer(
    interviews: &dyn InterviewRepository,
    ml: &dyn MlService,
    user_id: Uuid,
    interview_id: Uuid,
    question_index: i64,
    answer: String,
) -> Result<Evaluation, AppError> {
    let session = interviews
        .get(interview_id, user_id)
        .await?
        .ok_or_else(interview_not_found)?;

    let question = session.question(question_index)?.question.clone();

    if answer.trim().is_empty() {
        return Err(AppError::InvalidArgument("Answer is required".to_string()));
    }

    let evaluation = ml
        .evaluate_answer(&question, &answer, &session.role)
        .await
        .map_err(AppError::upstream("Failed to evaluate answer"))?;

    let recorded = evaluation.clone();
    let updated = interviews
        .update(
            interview_id,
            user_id,
            Box::new(move |s: &mut InterviewSession| {
                s.record_answer(question_index, answer, recorded, Utc::now())
            }),
        )
        .await?
        .ok_or_else(interview_not_found)?;

    info!(
        "Recorded answer {question_index} for interview {interview_id}: score {} ({})",
        evaluation.score,
        updated.status.as_str()
    );
    Ok(evaluation)
}

pub async fn get_result(
    interviews: &dyn InterviewRepository,
    user_id: Uuid,
    interview_id: Uuid,
) -> Result<InterviewSession, AppError> {
    interviews
        .get(interview_id, user_id)
        .await?
        .ok_or_else(interview_not_found)
}

pub async fn list_history(
    interviews: &dyn InterviewRepository,
    user_id: Uuid,
) -> Result<Vec<InterviewSummary>, AppError> {
    Ok(interviews
        .list_by_user(user_id)
        .await?
        .iter()
        .map(InterviewSession::summary)
        .collect())
}
