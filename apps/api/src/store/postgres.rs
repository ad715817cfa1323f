use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{
    duplicate_email, InterviewMutation, InterviewRepository, ResumeMutation, ResumeRepository,
    UserRepository,
};
use crate::errors::AppError;
use crate::models::interview::{InterviewRow, InterviewSession};
use crate::models::resume::{Resume, ResumeRow};
use crate::models::user::User;

/// Postgres-backed repositories sharing one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interviews
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl InterviewRepository for PgStore {
    async fn create(&self, session: &InterviewSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, user_id, resume_id, role, questions, overall_score, status, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.resume_id)
        .bind(&session.role)
        .bind(Json(&session.questions))
        .bind(session.overall_score as i32)
        .bind(session.status.as_str())
        .bind(session.completed_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Created interview {} for user {} ({} questions)",
            session.id,
            session.user_id,
            session.questions.len()
        );
        Ok(())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(InterviewSession::try_from)
        .transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InterviewSession>, AppError> {
        sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(InterviewSession::try_from)
        .collect()
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: InterviewMutation,
    ) -> Result<Option<InterviewSession>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent submissions to the same session.
        let row: Option<InterviewRow> = sqlx::query_as(
            "SELECT * FROM interviews WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut session = InterviewSession::try_from(row)?;

        // An error here drops `tx`, which rolls back.
        mutation(&mut session)?;

        sqlx::query(
            r#"
            UPDATE interviews
            SET questions = $1, overall_score = $2, status = $3, completed_at = $4
            WHERE id = $5
            "#,
        )
        .bind(Json(&session.questions))
        .bind(session.overall_score as i32)
        .bind(session.status.as_str())
        .bind(session.completed_at)
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(session))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ResumeRepository for PgStore {
    async fn create(&self, resume: &Resume) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, user_id, filename, extracted_data, analysis, classified_role,
                 role_confidence, matched_skills, alternative_roles, job_matches,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(resume.id)
        .bind(resume.user_id)
        .bind(&resume.filename)
        .bind(Json(&resume.extracted_data))
        .bind(Json(&resume.analysis))
        .bind(&resume.classified_role)
        .bind(resume.role_confidence)
        .bind(&resume.matched_skills)
        .bind(Json(&resume.alternative_roles))
        .bind(Json(&resume.job_matches))
        .bind(resume.created_at)
        .bind(resume.updated_at)
        .execute(&self.pool)
        .await?;

        info!("Stored resume {} for user {}", resume.id, resume.user_id);
        Ok(())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Resume::from))
    }

    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Resume::from))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Resume::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: ResumeMutation,
    ) -> Result<Option<Resume>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ResumeRow> = sqlx::query_as(
            "SELECT * FROM resumes WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut resume = Resume::from(row);
        mutation(&mut resume)?;
        resume.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE resumes
            SET classified_role = $1, role_confidence = $2, matched_skills = $3,
                alternative_roles = $4, job_matches = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&resume.classified_role)
        .bind(resume.role_confidence)
        .bind(&resume.matched_skills)
        .bind(Json(&resume.alternative_roles))
        .bind(Json(&resume.job_matches))
        .bind(resume.updated_at)
        .bind(resume.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(resume))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(duplicate_email()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }
}
