use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ml_client::Evaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewStatus {
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::InProgress => "in-progress",
            InterviewStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-progress" => Some(InterviewStatus::InProgress),
            "completed" => Some(InterviewStatus::Completed),
            _ => None,
        }
    }
}

/// One question slot. `user_answer` and `evaluation` are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub user_answer: Option<String>,
    pub evaluation: Option<Evaluation>,
}

impl QuestionRecord {
    fn unanswered(question: String) -> Self {
        Self {
            question,
            user_answer: None,
            evaluation: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.as_deref().is_some_and(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub role: String,
    pub questions: Vec<QuestionRecord>,
    pub overall_score: u32,
    pub status: InterviewStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InterviewSession {
    /// A fresh in-progress session with one empty slot per question.
    pub fn new(user_id: Uuid, resume_id: Option<Uuid>, role: String, questions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            resume_id,
            role,
            questions: questions.into_iter().map(QuestionRecord::unanswered).collect(),
            overall_score: 0,
            status: InterviewStatus::InProgress,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the question slot at `index`, rejecting anything outside
    /// `0..questions.len()`.
    pub fn question(&self, index: i64) -> Result<&QuestionRecord, AppError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.questions.get(i))
            .ok_or_else(|| AppError::InvalidArgument("Invalid question index".to_string()))
    }

    pub fn all_answered(&self) -> bool {
        self.questions.iter().all(QuestionRecord::is_answered)
    }

    /// Writes an answer and its evaluation into slot `index`, then completes
    /// the session if that was the last outstanding answer.
    ///
    /// Re-answering a slot overwrites it. A completed session stays completed
    /// and keeps its original `completed_at`; only the score is recomputed.
    pub fn record_answer(
        &mut self,
        index: i64,
        answer: String,
        evaluation: Evaluation,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.question(index)?;
        let slot = &mut self.questions[index as usize];
        slot.user_answer = Some(answer);
        slot.evaluation = Some(evaluation);

        if self.all_answered() {
            self.overall_score = average_score(&self.questions);
            if self.status == InterviewStatus::InProgress {
                self.status = InterviewStatus::Completed;
                self.completed_at = Some(now);
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> InterviewSummary {
        InterviewSummary {
            id: self.id,
            role: self.role.clone(),
            overall_score: self.overall_score,
            status: self.status,
            created_at: self.created_at,
            question_count: self.questions.len(),
        }
    }
}

/// Mean evaluation score over all slots, rounded half up.
/// Slots without an evaluation count as zero.
fn average_score(questions: &[QuestionRecord]) -> u32 {
    if questions.is_empty() {
        return 0;
    }
    let total: u64 = questions
        .iter()
        .map(|q| q.evaluation.as_ref().map_or(0, |e| u64::from(e.score)))
        .sum();
    let count = questions.len() as u64;
    ((2 * total + count) / (2 * count)) as u32
}

/// History projection: no answers or evaluations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummary {
    pub id: Uuid,
    pub role: String,
    pub overall_score: u32,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
    pub question_count: usize,
}

#[derive(Debug, Clone, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub role: String,
    pub questions: Json<Vec<QuestionRecord>>,
    pub overall_score: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for InterviewSession {
    type Error = AppError;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        let status = InterviewStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "interview {} has unknown status '{}'",
                row.id,
                row.status
            ))
        })?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            resume_id: row.resume_id,
            role: row.role,
            questions: row.questions.0,
            overall_score: row.overall_score.clamp(0, 100) as u32,
            status,
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}
