// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A multiple-choice question as produced by the chatbox.
/// Never stored on its own: the whole list is persisted as JSON text on the assessment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-indexed position inside the quiz.
    pub question_number: u32,

    /// Question text; may contain LaTeX.
    pub question: String,

    /// Ordered options (e.g. A, B, C, D).
    #[serde(default)]
    pub answers: Vec<AnswerOption>,

    /// Label of the correct option.
    #[serde(default)]
    pub right_answer: String,

    /// Suggested time budget in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub content: String,
}

/// One answer picked by the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AnswerSubmission {
    #[validate(range(min = 1))]
    pub question_number: u32,

    #[serde(alias = "answer_label")]
    #[validate(length(min = 1, max = 16, message = "Answer label must be 1-16 characters."))]
    pub answer: String,
}

/// Grading result returned by the chatbox for a submission.
/// Every field falls back to its default when the model omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizAssessmentAnswer {
    pub total_questions: u32,
    pub correct_number: u32,
    /// 0..=100
    pub score_percentage: u32,
    pub ai_review: String,
    pub ai_detect_grade: String,
}
