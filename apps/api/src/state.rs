use std::sync::Arc;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::ml_client::MlService;
use crate::store::{InterviewRepository, ResumeRepository, UserRepository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub interviews: Arc<dyn InterviewRepository>,
    pub resumes: Arc<dyn ResumeRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Pluggable ML backend. Production: `MlClient` over HTTP.
    pub ml: Arc<dyn MlService>,
    pub tokens: TokenKeys,
    pub config: Config,
}
