// src/services/quiz_assessment.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    chatbox::{Chatbox, PromptBuilder},
    config::QuizConfig,
    error::AppError,
    models::{
        chatbox::ChatBoxResponse,
        profile::UserProfile,
        question::{Question, QuizAssessmentAnswer},
        quiz_assessment::{
            GenerateQuizAssessmentRequest, GetUserQuizAssessmentsHistoryRequest, HistoryPayload,
            ReinforceQuizAssessmentRequest, SubmitQuizAssessmentRequest,
            SubmitReinforceQuizAssessmentRequest,
        },
        user_quiz_assessment::{
            AssessmentPatch, NewUserQuizAssessment, UserQuizAssessment,
            UserQuizAssessmentResponse,
        },
    },
    repository::AssessmentRepository,
    services::profile::ProfileProvider,
};

/// Drives an assessment row through its lifecycle:
/// QUESTIONED (generate) -> ANSWERED (submit) -> REVIEWED (grading reply),
/// with reinforcement rounds derived from a reviewed row.
///
/// All state changes happen here; the chatbox and the repository never
/// advance a row on their own. Steps run strictly in order and nothing is
/// rolled back: a failure leaves the row at its last successful write.
#[derive(Clone)]
pub struct QuizAssessmentService {
    chatbox: Arc<dyn Chatbox>,
    repository: Arc<dyn AssessmentRepository>,
    profiles: Arc<dyn ProfileProvider>,
    prompts: PromptBuilder,
    allow_resubmit: bool,
}

impl QuizAssessmentService {
    pub fn new(
        chatbox: Arc<dyn Chatbox>,
        repository: Arc<dyn AssessmentRepository>,
        profiles: Arc<dyn ProfileProvider>,
        quiz: &QuizConfig,
    ) -> Self {
        Self {
            chatbox,
            repository,
            profiles,
            prompts: PromptBuilder::new(quiz),
            allow_resubmit: quiz.allow_resubmit,
        }
    }

    /// Generates a quiz and stores it as a new assessment row.
    pub async fn generate_quiz_assessment(
        &self,
        req: GenerateQuizAssessmentRequest,
    ) -> Result<ChatBoxResponse<Vec<Question>>, AppError> {
        req.validate()?;

        let profile = self.fetch_profile(&req.uid).await?;
        let conversation = self.prompts.generate(&req, profile.as_ref());

        let mut chat = self.chatbox.generate(&conversation).await?;

        let questions = serde_json::to_string(&chat.data)?;
        let assessment = self
            .repository
            .create(NewUserQuizAssessment {
                uid: req.uid.clone(),
                questions,
                ..Default::default()
            })
            .await?;

        tracing::info!(
            "Generated quiz assessment {} for {} ({} questions)",
            assessment.id,
            req.uid,
            chat.data.len()
        );

        chat.user_quiz_assessment_id = Some(assessment.id.to_string());
        Ok(chat)
    }

    /// Stores the learner's answers, then has the chatbox grade them.
    ///
    /// The review is written only when the grading reply carries one; otherwise the
    /// row stays ANSWERED and the client may submit again.
    pub async fn submit_quiz_assessment(
        &self,
        req: SubmitQuizAssessmentRequest,
    ) -> Result<ChatBoxResponse<QuizAssessmentAnswer>, AppError> {
        req.validate()?;

        let id = parse_assessment_id(&req.user_quiz_assessment_id)?;
        let assessment = self.owned_assessment(id, &req.uid).await?;

        if !self.allow_resubmit && !assessment.answers.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Quiz assessment {} has already been submitted",
                id
            )));
        }

        let answers_json = serde_json::to_string(&req.answers)?;
        let updated = self
            .repository
            .update(id, AssessmentPatch::answers(answers_json.clone()))
            .await?;
        if updated == 0 {
            // Deleted between the lookup and the write.
            return Err(not_found(id));
        }

        let conversation = self.prompts.submit(&req, &assessment, &answers_json);
        let chat = self.chatbox.submit_assessment(&conversation).await?;

        if chat.data.ai_review.is_empty() {
            tracing::warn!(
                "Chatbox returned no review for assessment {}; leaving it answered",
                id
            );
        } else {
            self.repository
                .update(
                    id,
                    AssessmentPatch::review(
                        chat.data.ai_review.clone(),
                        chat.data.ai_detect_grade.clone(),
                    ),
                )
                .await?;
        }

        Ok(chat)
    }

    /// Builds a reinforcement quiz from a prior assessment. Nothing is persisted here.
    pub async fn reinforce_quiz_assessment(
        &self,
        req: ReinforceQuizAssessmentRequest,
    ) -> Result<ChatBoxResponse<Vec<Question>>, AppError> {
        req.validate()?;

        let id = parse_assessment_id(&req.user_quiz_assessment_id)?;
        let assessment = self.owned_assessment(id, &req.uid).await?;

        let conversation = self.prompts.reinforce(&req, &assessment);
        let chat = self.chatbox.reinforce(&conversation).await?;

        Ok(chat)
    }

    /// Grades a reinforcement round and, when reviewed, stores it as a new row.
    pub async fn submit_reinforce_quiz_assessment(
        &self,
        req: SubmitReinforceQuizAssessmentRequest,
    ) -> Result<ChatBoxResponse<QuizAssessmentAnswer>, AppError> {
        req.validate()?;
        let reinforcement_questions = req
            .common
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("message must carry the reinforcement questions".to_string())
            })?;

        let id = parse_assessment_id(&req.user_quiz_assessment_id)?;
        let assessment = self.owned_assessment(id, &req.uid).await?;

        let profile = self.fetch_profile(&req.uid).await?;
        let answers_json = serde_json::to_string(&req.answers)?;

        let conversation =
            self.prompts
                .submit_reinforce(&req, &assessment, &answers_json, profile.as_ref());
        let mut chat = self.chatbox.submit_assessment(&conversation).await?;

        if !chat.data.ai_review.is_empty() {
            // TODO: store the question list returned by the reinforce call once clients
            // send it back structured; the raw request message is kept for compatibility.
            let reinforced = self
                .repository
                .create(NewUserQuizAssessment {
                    uid: req.uid.clone(),
                    questions: reinforcement_questions,
                    answers: answers_json,
                    ai_review: chat.data.ai_review.clone(),
                    ai_detect_grade: chat.data.ai_detect_grade.clone(),
                })
                .await?;

            tracing::info!(
                "Stored reinforcement assessment {} derived from {}",
                reinforced.id,
                id
            );
            chat.user_quiz_assessment_id = Some(reinforced.id.to_string());
        }

        Ok(chat)
    }

    pub async fn get_user_quiz_assessments_history(
        &self,
        req: GetUserQuizAssessmentsHistoryRequest,
    ) -> Result<HistoryPayload<UserQuizAssessmentResponse>, AppError> {
        req.validate()?;

        let (rows, metadata) = self.repository.list_by_uid(&req.to_params()).await?;

        Ok(HistoryPayload {
            items: rows.into_iter().map(Into::into).collect(),
            metadata,
        })
    }

    pub async fn get_user_quiz_assessment(
        &self,
        uid: &str,
        id: &str,
    ) -> Result<UserQuizAssessmentResponse, AppError> {
        let id = parse_assessment_id(id)?;
        let assessment = self.owned_assessment(id, uid).await?;
        Ok(assessment.into())
    }

    /// Soft delete of a row owned by `uid`.
    pub async fn delete_user_quiz_assessment(&self, uid: &str, id: &str) -> Result<(), AppError> {
        let id = parse_assessment_id(id)?;
        self.owned_assessment(id, uid).await?;

        if self.repository.delete(id).await? == 0 {
            return Err(not_found(id));
        }
        tracing::info!("Soft-deleted quiz assessment {}", id);
        Ok(())
    }

    /// Hard delete, regardless of owner or soft-delete state.
    pub async fn force_delete_user_quiz_assessment(&self, id: &str) -> Result<(), AppError> {
        let id = parse_assessment_id(id)?;

        if self.repository.force_delete(id).await? == 0 {
            return Err(not_found(id));
        }
        tracing::info!("Force-deleted quiz assessment {}", id);
        Ok(())
    }

    async fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        let profile = self.profiles.fetch_profile(uid).await?;
        if profile.is_none() {
            tracing::debug!("No profile for {}, using neutral grade and semester", uid);
        }
        Ok(profile)
    }

    /// Rows owned by someone else are reported as missing.
    async fn owned_assessment(&self, id: Uuid, uid: &str) -> Result<UserQuizAssessment, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|a| a.uid == uid)
            .ok_or_else(|| not_found(id))
    }
}

fn parse_assessment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        AppError::BadRequest(format!("Invalid user_quiz_assessment_id '{}'", raw))
    })
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Quiz assessment {} not found", id))
}
