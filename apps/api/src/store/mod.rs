//! Repository interfaces over the persisted store.
//!
//! Every lookup takes the owning `user_id` alongside the record id: a record
//! owned by somebody else is reported as `None`, exactly like a missing one.
//!
//! Updates take a mutation closure and apply it atomically. If the closure
//! returns an error nothing is written.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::InterviewSession;
use crate::models::resume::Resume;
use crate::models::user::User;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub type InterviewMutation =
    Box<dyn FnOnce(&mut InterviewSession) -> Result<(), AppError> + Send>;

pub type ResumeMutation = Box<dyn FnOnce(&mut Resume) -> Result<(), AppError> + Send>;

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn create(&self, session: &InterviewSession) -> Result<(), AppError>;

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<InterviewSession>, AppError>;

    /// Newest-created first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<InterviewSession>, AppError>;

    /// Runs `mutation` against the stored session under a per-session lock
    /// and persists the result. Returns `None` if the session does not exist
    /// for this user.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: InterviewMutation,
    ) -> Result<Option<InterviewSession>, AppError>;
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create(&self, resume: &Resume) -> Result<(), AppError>;

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Resume>, AppError>;

    /// The user's most recently created resume, if any.
    async fn find_latest_by_user(&self, user_id: Uuid) -> Result<Option<Resume>, AppError>;

    /// Newest-created first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError>;

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        mutation: ResumeMutation,
    ) -> Result<Option<Resume>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `InvalidArgument` if the email is already registered.
    async fn create(&self, user: &User) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::InvalidArgument("User already exists with this email".to_string())
}
