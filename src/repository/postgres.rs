// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user_quiz_assessment::{
        AssessmentPatch, AssessmentStatus, ListAssessmentsParams, NewUserQuizAssessment,
        Pagination, UserQuizAssessment,
    },
    repository::AssessmentRepository,
};

const COLUMNS: &str = "id, uid, questions, answers, ai_review, ai_detect_grade, status, \
                       create_id, create_dt, modify_id, modify_dt, deleted_dt";

/// Shared by the page query and its COUNT sibling.
const WHERE_OWNED_ACTIVE: &str = "WHERE uid = $1 AND deleted_dt IS NULL";

#[derive(Clone)]
pub struct PgAssessmentRepository {
    pool: PgPool,
}

impl PgAssessmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentRepository for PgAssessmentRepository {
    async fn create(&self, new: NewUserQuizAssessment) -> Result<UserQuizAssessment, AppError> {
        let sql = format!(
            r#"
            INSERT INTO user_quiz_assessments
                (id, uid, questions, answers, ai_review, ai_detect_grade, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserQuizAssessment>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.uid)
            .bind(&new.questions)
            .bind(&new.answers)
            .bind(&new.ai_review)
            .bind(&new.ai_detect_grade)
            .bind(AssessmentStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create quiz assessment: {:?}", e);
                AppError::from(e)
            })?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserQuizAssessment>, AppError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM user_quiz_assessments WHERE id = $1 AND deleted_dt IS NULL"
        );

        let row = sqlx::query_as::<_, UserQuizAssessment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch quiz assessment {}: {:?}", id, e);
                AppError::from(e)
            })?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: AssessmentPatch) -> Result<u64, AppError> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut query_builder =
            QueryBuilder::<Postgres>::new("UPDATE user_quiz_assessments SET modify_dt = NOW()");

        if let Some(questions) = patch.questions {
            // Questions are write-once.
            query_builder
                .push(", questions = CASE WHEN questions = '' THEN ")
                .push_bind(questions)
                .push(" ELSE questions END");
        }
        if let Some(answers) = patch.answers {
            query_builder.push(", answers = ").push_bind(answers);
        }
        if let Some(ai_review) = patch.ai_review {
            query_builder.push(", ai_review = ").push_bind(ai_review);
        }
        if let Some(ai_detect_grade) = patch.ai_detect_grade {
            query_builder
                .push(", ai_detect_grade = ")
                .push_bind(ai_detect_grade);
        }
        if let Some(status) = patch.status {
            query_builder.push(", status = ").push_bind(status.as_str());
        }
        if let Some(modify_id) = patch.modify_id {
            query_builder.push(", modify_id = ").push_bind(modify_id);
        }

        query_builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_dt IS NULL");

        let result = query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update quiz assessment {}: {:?}", id, e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn list_by_uid(
        &self,
        params: &ListAssessmentsParams,
    ) -> Result<(Vec<UserQuizAssessment>, Pagination), AppError> {
        let count_sql = format!("SELECT COUNT(*) FROM user_quiz_assessments {WHERE_OWNED_ACTIVE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&params.uid)
            .fetch_one(&self.pool)
            .await?;

        let pagination = Pagination::new(
            params.page,
            params.limit,
            u64::try_from(total).unwrap_or(0),
            params.take_all,
        );

        if pagination.total_count == 0 {
            return Ok((Vec::new(), pagination));
        }

        let direction = if params.order_desc { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {COLUMNS} FROM user_quiz_assessments {WHERE_OWNED_ACTIVE} \
             ORDER BY {column} {direction}, id {direction} LIMIT $2 OFFSET $3",
            column = params.order_by.column(),
        );

        let rows = sqlx::query_as::<_, UserQuizAssessment>(&sql)
            .bind(&params.uid)
            .bind(i64::from(pagination.size))
            .bind(i64::try_from(pagination.skip).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list quiz assessments for {}: {:?}", params.uid, e);
                AppError::from(e)
            })?;

        Ok((rows, pagination))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_quiz_assessments
            SET deleted_dt = NOW(), modify_dt = NOW()
            WHERE id = $1 AND deleted_dt IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn force_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_quiz_assessments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
