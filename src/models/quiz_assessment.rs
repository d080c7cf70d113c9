// src/models/quiz_assessment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    models::{
        conversation::QuizPurpose,
        question::AnswerSubmission,
        user_quiz_assessment::{AssessmentOrder, ListAssessmentsParams},
    },
};

/// Request shaping fields shared by every pipeline request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChatboxCommon {
    /// Free text from the client. On SubmitReinforce it carries the reinforcement questions.
    #[serde(default)]
    #[validate(length(max = 100_000))]
    pub message: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,
    #[serde(default)]
    #[validate(range(min = 1, max = 32_000))]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    #[validate(length(max = 20_000))]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub purpose: Option<QuizPurpose>,
    #[serde(default)]
    pub question_count: Option<u32>,
}

/// DTO for generating a new quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GenerateQuizAssessmentRequest {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub common: ChatboxCommon,
}

/// DTO for submitting answers to a generated quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmitQuizAssessmentRequest {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
    #[validate(length(min = 1, message = "user_quiz_assessment_id is required."))]
    pub user_quiz_assessment_id: String,
    #[validate(length(min = 1, message = "answers must not be empty."), nested)]
    pub answers: Vec<AnswerSubmission>,
    #[serde(flatten)]
    #[validate(nested)]
    pub common: ChatboxCommon,
}

/// DTO for requesting a reinforcement quiz derived from a reviewed assessment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReinforceQuizAssessmentRequest {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
    #[validate(length(min = 1, message = "user_quiz_assessment_id is required."))]
    pub user_quiz_assessment_id: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub common: ChatboxCommon,
}

/// DTO for submitting answers to a reinforcement quiz.
/// `common.message` must carry the reinforcement questions shown to the learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmitReinforceQuizAssessmentRequest {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
    #[validate(length(min = 1, message = "user_quiz_assessment_id is required."))]
    pub user_quiz_assessment_id: String,
    #[validate(length(min = 1, message = "answers must not be empty."), nested)]
    pub answers: Vec<AnswerSubmission>,
    #[serde(flatten)]
    #[validate(nested)]
    pub common: ChatboxCommon,
}

/// Query parameters for the history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GetUserQuizAssessmentsHistoryRequest {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order_by: Option<String>,
    pub order_desc: Option<bool>,
    pub take_all: Option<bool>,
}

impl GetUserQuizAssessmentsHistoryRequest {
    /// Applies defaults: page 1, limit 10 (max 100), newest first.
    pub fn to_params(&self) -> ListAssessmentsParams {
        ListAssessmentsParams {
            uid: self.uid.clone(),
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            order_by: AssessmentOrder::parse(self.order_by.as_deref()),
            order_desc: self.order_desc.unwrap_or(true),
            take_all: self.take_all.unwrap_or(false),
        }
    }
}

/// Query parameters for single-row endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OwnerQuery {
    #[validate(length(min = 1, max = 36, message = "uid is required."))]
    pub uid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryPayload<T> {
    pub items: Vec<T>,
    pub metadata: crate::models::user_quiz_assessment::Pagination,
}
