//! ML Client: the single point of entry for all calls to the ML service.
//!
//! Every resume-parsing, classification, question-generation and evaluation
//! request goes through `MlService`. Calls are made once: no retry, no
//! fallback. A failed call fails the operation that issued it.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod types;

#[cfg(test)]
pub mod fake;

pub use types::{
    AlternativeRole, Evaluation, ExtractedData, JobDescriptionMatch, ParsedResume,
    ResumeAnalysis, RoleClassification,
};
use types::{
    ClassifyRoleRequest, EvaluateAnswerRequest, GenerateQuestionsRequest, GeneratedQuestions,
    MatchJobDescriptionRequest, MatchJobRequest, MlErrorBody, RawEvaluation,
};

#[derive(Debug, Error)]
pub enum MlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ML service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid ML response: {0}")]
    InvalidResponse(String),
}

/// The ML service contract. Carried in `AppState` as `Arc<dyn MlService>`.
#[async_trait]
pub trait MlService: Send + Sync {
    async fn parse_resume(&self, filename: &str, content: Bytes)
        -> Result<ParsedResume, MlError>;

    async fn classify_role(&self, skills: &[String]) -> Result<RoleClassification, MlError>;

    /// Returns the ordered question texts for an interview.
    async fn generate_questions(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<Vec<String>, MlError>;

    async fn evaluate_answer(
        &self,
        question: &str,
        answer: &str,
        role: &str,
    ) -> Result<Evaluation, MlError>;

    /// Payload is passed through to the caller untouched.
    async fn match_job(&self, skills: &[String], role: &str)
        -> Result<serde_json::Value, MlError>;

    async fn match_job_description(
        &self,
        resume_skills: &[String],
        job_description: &str,
    ) -> Result<JobDescriptionMatch, MlError>;
}

/// HTTP implementation of `MlService`.
#[derive(Clone)]
pub struct MlClient {
    client: Client,
    base_url: String,
}

impl MlClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MlError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, MlError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(path, response).await
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, MlError> {
    let status = response.status();
    let body = response.bytes().await?;
    decode_body(path, status, &body)
}

/// Turns a non-2xx response into `MlError::Api`, otherwise decodes the body.
/// The service reports failures as `{"error": "..."}`; any other error body
/// is passed through as text.
fn decode_body<T: DeserializeOwned>(
    path: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<T, MlError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<MlErrorBody>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
        warn!("ML service {path} returned {status}: {message}");
        return Err(MlError::Api {
            status: status.as_u16(),
            message,
        });
    }

    debug!("ML service {path} succeeded ({} bytes)", body.len());
    serde_json::from_slice(body).map_err(|e| MlError::InvalidResponse(format!("{path}: {e}")))
}

#[async_trait]
impl MlService for MlClient {
    async fn parse_resume(
        &self,
        filename: &str,
        content: Bytes,
    ) -> Result<ParsedResume, MlError> {
        let part = multipart::Part::bytes(content.to_vec()).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/ml/parse-resume"))
            .multipart(form)
            .send()
            .await?;

        decode::<ParsedResume>("/ml/parse-resume", response)
            .await?
            .validate()
    }

    async fn classify_role(&self, skills: &[String]) -> Result<RoleClassification, MlError> {
        self.post_json::<_, RoleClassification>(
            "/ml/classify-role",
            &ClassifyRoleRequest { skills },
        )
        .await?
        .validate()
    }

    async fn generate_questions(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<Vec<String>, MlError> {
        self.post_json::<_, GeneratedQuestions>(
            "/ml/generate-questions",
            &GenerateQuestionsRequest { role, skills },
        )
        .await?
        .validate()
    }

    async fn evaluate_answer(
        &self,
        question: &str,
        answer: &str,
        role: &str,
    ) -> Result<Evaluation, MlError> {
        self.post_json::<_, RawEvaluation>(
            "/ml/evaluate-answer",
            &EvaluateAnswerRequest {
                question,
                answer,
                role,
            },
        )
        .await?
        .validate()
    }

    async fn match_job(
        &self,
        skills: &[String],
        role: &str,
    ) -> Result<serde_json::Value, MlError> {
        self.post_json("/ml/match-job", &MatchJobRequest { skills, role })
            .await
    }

    async fn match_job_description(
        &self,
        resume_skills: &[String],
        job_description: &str,
    ) -> Result<JobDescriptionMatch, MlError> {
        self.post_json::<_, JobDescriptionMatch>(
            "/ml/match-job-description",
            &MatchJobDescriptionRequest {
                resume_skills,
                job_description,
            },
        )
        .await?
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = MlClient::new("http://ml:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url("/ml/evaluate-answer"),
            "http://ml:8000/ml/evaluate-answer"
        );
    }

    #[test]
    fn test_match_job_description_request_is_camel_case() {
        let skills = vec!["rust".to_string()];
        let body = serde_json::to_value(MatchJobDescriptionRequest {
            resume_skills: &skills,
            job_description: "Rust engineer",
        })
        .unwrap();
        assert_eq!(body["resumeSkills"][0], "rust");
        assert_eq!(body["jobDescription"], "Rust engineer");
    }

    #[test]
    fn test_error_status_uses_message_from_error_body() {
        let err = decode_body::<GeneratedQuestions>(
            "/ml/generate-questions",
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"Role is required"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MlError::Api { status: 500, ref message } if message == "Role is required"
        ));
    }

    #[test]
    fn test_error_status_with_plain_body_keeps_text() {
        let err = decode_body::<serde_json::Value>(
            "/ml/match-job",
            StatusCode::SERVICE_UNAVAILABLE,
            b"upstream connect error",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MlError::Api { status: 503, ref message } if message == "upstream connect error"
        ));
    }

    #[test]
    fn test_success_with_wrong_shape_is_invalid_response() {
        let err = decode_body::<GeneratedQuestions>(
            "/ml/generate-questions",
            StatusCode::OK,
            br#"{"questions": 3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MlError::InvalidResponse(ref m) if m.starts_with("/ml/generate-questions")));
    }

    #[test]
    fn test_success_body_is_decoded_then_validated() {
        let questions = decode_body::<GeneratedQuestions>(
            "/ml/generate-questions",
            StatusCode::OK,
            br#"{"questions": ["What is a borrow?"]}"#,
        )
        .and_then(GeneratedQuestions::validate)
        .unwrap();
        assert_eq!(questions, vec!["What is a borrow?".to_string()]);
    }

    #[test]
    fn test_ml_failure_surfaces_as_bad_gateway() {
        let err = decode_body::<RawEvaluation>(
            "/ml/evaluate-answer",
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"model not loaded"}"#,
        )
        .map_err(crate::errors::AppError::upstream("Failed to evaluate answer"))
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Failed to evaluate answer");
    }
}
