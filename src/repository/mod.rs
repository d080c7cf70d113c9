// src/repository/mod.rs

pub mod memory;
pub mod postgres;

pub use memory::MemoryAssessmentRepository;
pub use postgres::PgAssessmentRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user_quiz_assessment::{
        AssessmentPatch, ListAssessmentsParams, NewUserQuizAssessment, Pagination,
        UserQuizAssessment,
    },
};

/// Storage for `user_quiz_assessments`.
///
/// Every read path hides soft-deleted rows. Each call is a single statement;
/// nothing here opens a transaction.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Inserts a row with a fresh UUID and status ACTIVE.
    async fn create(&self, new: NewUserQuizAssessment) -> Result<UserQuizAssessment, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserQuizAssessment>, AppError>;

    /// Applies a partial update and returns the number of rows affected.
    async fn update(&self, id: Uuid, patch: AssessmentPatch) -> Result<u64, AppError>;

    async fn list_by_uid(
        &self,
        params: &ListAssessmentsParams,
    ) -> Result<(Vec<UserQuizAssessment>, Pagination), AppError>;

    /// Soft delete.
    async fn delete(&self, id: Uuid) -> Result<u64, AppError>;

    /// Hard delete, including rows that were already soft-deleted.
    async fn force_delete(&self, id: Uuid) -> Result<u64, AppError>;
}
