// src/handlers/quiz_assessment.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiQuery},
    models::{
        quiz_assessment::{
            GenerateQuizAssessmentRequest, GetUserQuizAssessmentsHistoryRequest, OwnerQuery,
            ReinforceQuizAssessmentRequest, SubmitQuizAssessmentRequest,
            SubmitReinforceQuizAssessmentRequest,
        },
        response::{ApiResponse, ResultPayload},
    },
    services::QuizAssessmentService,
};

/// Generates a new quiz for the learner and stores it.
/// The new assessment id is returned in `result.user_quiz_assessment_id`.
pub async fn generate(
    State(quiz): State<Arc<QuizAssessmentService>>,
    ApiJson(req): ApiJson<GenerateQuizAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = quiz.generate_quiz_assessment(req).await?;
    Ok(Json(ApiResponse::success(ResultPayload { result })))
}

/// Submits answers for grading.
pub async fn submit(
    State(quiz): State<Arc<QuizAssessmentService>>,
    ApiJson(req): ApiJson<SubmitQuizAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = quiz.submit_quiz_assessment(req).await?;
    Ok(Json(ApiResponse::success(ResultPayload { result })))
}

pub async fn reinforce(
    State(quiz): State<Arc<QuizAssessmentService>>,
    ApiJson(req): ApiJson<ReinforceQuizAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = quiz.reinforce_quiz_assessment(req).await?;
    Ok(Json(ApiResponse::success(ResultPayload { result })))
}

pub async fn submit_reinforce(
    State(quiz): State<Arc<QuizAssessmentService>>,
    ApiJson(req): ApiJson<SubmitReinforceQuizAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = quiz.submit_reinforce_quiz_assessment(req).await?;
    Ok(Json(ApiResponse::success(ResultPayload { result })))
}

/// Paginated quiz history of one learner, newest first by default.
pub async fn history(
    State(quiz): State<Arc<QuizAssessmentService>>,
    ApiQuery(req): ApiQuery<GetUserQuizAssessmentsHistoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = quiz.get_user_quiz_assessments_history(req).await?;
    Ok(Json(ApiResponse::success(payload)))
}

pub async fn get_one(
    State(quiz): State<Arc<QuizAssessmentService>>,
    Path(id): Path<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> Result<impl IntoResponse, AppError> {
    owner.validate()?;
    let assessment = quiz.get_user_quiz_assessment(&owner.uid, &id).await?;
    Ok(Json(ApiResponse::success(assessment)))
}

/// Soft-deletes one of the learner's assessments.
pub async fn delete(
    State(quiz): State<Arc<QuizAssessmentService>>,
    Path(id): Path<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> Result<impl IntoResponse, AppError> {
    owner.validate()?;
    quiz.delete_user_quiz_assessment(&owner.uid, &id).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "id": id }))))
}

/// Permanently removes an assessment row.
/// Admin surface.
pub async fn force_delete(
    State(quiz): State<Arc<QuizAssessmentService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    quiz.force_delete_user_quiz_assessment(&id).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "id": id }))))
}
