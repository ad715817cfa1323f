//! In-memory repositories for tests. One mutex per collection, held for the
//! whole of an `update` so mutations are atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    duplicate_email, InterviewMutation, InterviewRepository, ResumeMutation, ResumeRepository,
    UserRepository,
};
use crate::errors::AppError;
use crate::models::interview::InterviewSession;
use crate::models::resume::Resume;
use crate::models::user::User;

#[derive(Default)]
pub struct MemoryStore {
    interviews: Mutex<Vec<InterviewSession>>,
    resumes: Mutex<Vec<Resume>>,
    users: Mutex<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored session regardless of owner.
    pub async fn all_interviews(&self) -> Vec<InterviewSession> {
        self.interviews.lock().await.clone()
    }
}

/// Newest first; later insertions win ties on `created_at`.
fn newest_first<T: Clone>(
    items: &[T],
    keep: impl Fn(&T) -> bool,
    created: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().filter(|i| keep(*i)).cloned().collect();
    out.sort_by(|a, b| created(b).cmp(&created(a)));
    out
}

#[async_trait]
impl InterviewRepository for MemoryStore {
    async fn create(&self, session: &InterviewSession) -> Result<(), AppError> {
        self.interviews.lock().await.push(session.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        Ok(self
            .interviews
            .lock()
            .await
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InterviewSession>, AppError> {
        let sessions = self.interviews.lock().await;
        Ok(newest_first(&sessions, |s| s.user_id == user_id, |s| s.created_at))
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: InterviewMutation,
    ) -> Result<Option<InterviewSession>, AppError> {
        let mut sessions = self.interviews.lock().await;
        let Some(stored) = sessions
            .iter_mut()
            .find(|s| s.id == id && s.user_id == user_id)
        else {
            return Ok(None);
        };
        let mut working = stored.clone();
        mutation(&mut working)?;
        *stored = working.clone();
        Ok(Some(working))
    }
}

#[async_trait]
impl ResumeRepository for MemoryStore {
    async fn create(&self, resume: &Resume) -> Result<(), AppError> {
        self.resumes.lock().await.push(resume.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(self
            .resumes
            .lock()
            .await
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(ResumeRepository::list_by_user(self, user_id)
            .await?
            .into_iter()
            .next())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
        let resumes = self.resumes.lock().await;
        Ok(newest_first(&resumes, |r| r.user_id == user_id, |r| r.created_at))
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: ResumeMutation,
    ) -> Result<Option<Resume>, AppError> {
        let mut resumes = self.resumes.lock().await;
        let Some(stored) = resumes
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        let mut working = stored.clone();
        mutation(&mut working)?;
        working.updated_at = Utc::now();
        *stored = working.clone();
        Ok(Some(working))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(duplicate_email());
        }
        users.push(user.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}
