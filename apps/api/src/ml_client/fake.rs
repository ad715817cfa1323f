//! Scripted `MlService` for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    Evaluation, ExtractedData, JobDescriptionMatch, MlError, MlService, ParsedResume,
    ResumeAnalysis, RoleClassification,
};

pub struct FakeMl {
    questions: Mutex<Vec<String>>,
    scores: Mutex<VecDeque<u32>>,
    skills: Mutex<Vec<String>>,
    failing: AtomicBool,
    classify_failing: AtomicBool,
    /// Skill lists passed to `generate_questions`, in call order.
    pub seen_question_skills: Mutex<Vec<Vec<String>>>,
    /// Roles passed to `generate_questions`, in call order.
    pub seen_question_roles: Mutex<Vec<String>>,
    /// `(question, answer, role)` triples passed to `evaluate_answer`.
    pub seen_evaluations: Mutex<Vec<(String, String, String)>>,
}

impl FakeMl {
    pub fn new() -> Self {
        Self {
            questions: Mutex::new(vec![
                "Describe a system you designed.".to_string(),
                "How do you debug a production incident?".to_string(),
                "Explain database indexing.".to_string(),
            ]),
            scores: Mutex::new(VecDeque::new()),
            skills: Mutex::new(vec!["rust".to_string(), "sql".to_string()]),
            failing: AtomicBool::new(false),
            classify_failing: AtomicBool::new(false),
            seen_question_skills: Mutex::new(Vec::new()),
            seen_question_roles: Mutex::new(Vec::new()),
            seen_evaluations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_questions(self, questions: &[&str]) -> Self {
        *self.questions.lock().unwrap() = questions.iter().map(|q| q.to_string()).collect();
        self
    }

    pub fn with_skills(self, skills: &[&str]) -> Self {
        *self.skills.lock().unwrap() = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Scores handed out by successive `evaluate_answer` calls. Once the
    /// queue is empty every evaluation scores 50.
    pub fn push_scores(&self, scores: &[u32]) {
        self.scores.lock().unwrap().extend(scores.iter().copied());
    }

    /// Makes every call fail as if the service were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_classify_failing(&self, failing: bool) {
        self.classify_failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), MlError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(MlError::Api {
                status: 503,
                message: "ML service unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MlService for FakeMl {
    async fn parse_resume(
        &self,
        _filename: &str,
        _content: Bytes,
    ) -> Result<ParsedResume, MlError> {
        self.check()?;
        let skills = self.skills.lock().unwrap().clone();
        Ok(ParsedResume {
            extracted_data: ExtractedData {
                name: Some("Ada Lovelace".to_string()),
                email: Some("ada@example.com".to_string()),
                skills,
                experience: Some("Analytical engines".to_string()),
            },
            analysis: ResumeAnalysis {
                score: 76.0,
                strengths: vec!["Contact information clearly provided".to_string()],
                improvements: vec![],
                missing_skills: vec![],
            },
        })
    }

    async fn classify_role(&self, skills: &[String]) -> Result<RoleClassification, MlError> {
        self.check()?;
        if self.classify_failing.load(Ordering::SeqCst) {
            return Err(MlError::InvalidResponse("classifier offline".to_string()));
        }
        Ok(RoleClassification {
            role: "Backend Developer".to_string(),
            confidence: 72.5,
            matched_skills: skills.to_vec(),
            alternative_roles: vec![],
        })
    }

    async fn generate_questions(
        &self,
        role: &str,
        skills: &[String],
    ) -> Result<Vec<String>, MlError> {
        self.check()?;
        self.seen_question_roles.lock().unwrap().push(role.to_string());
        self.seen_question_skills
            .lock()
            .unwrap()
            .push(skills.to_vec());
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn evaluate_answer(
        &self,
        question: &str,
        answer: &str,
        role: &str,
    ) -> Result<Evaluation, MlError> {
        self.check()?;
        self.seen_evaluations.lock().unwrap().push((
            question.to_string(),
            answer.to_string(),
            role.to_string(),
        ));
        let score = self.scores.lock().unwrap().pop_front().unwrap_or(50);
        Ok(Evaluation {
            score,
            feedback: format!("Scored {score}"),
            keywords: vec!["api".to_string()],
        })
    }

    async fn match_job(
        &self,
        skills: &[String],
        role: &str,
    ) -> Result<serde_json::Value, MlError> {
        self.check()?;
        Ok(serde_json::json!({ "role": role, "matched": skills }))
    }

    async fn match_job_description(
        &self,
        resume_skills: &[String],
        _job_description: &str,
    ) -> Result<JobDescriptionMatch, MlError> {
        self.check()?;
        Ok(JobDescriptionMatch {
            match_score: 66.7,
            matching_skills: resume_skills.to_vec(),
            missing_skills: vec!["kubernetes".to_string()],
            recommendations: vec!["Learn kubernetes".to_string()],
        })
    }
}
