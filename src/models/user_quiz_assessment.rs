// src/models/user_quiz_assessment.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row status. Stored as VARCHAR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    #[default]
    Active,
    Inactive,
    Banned,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown assessment status: {0}")]
pub struct UnknownStatus(pub String);

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Active => "ACTIVE",
            AssessmentStatus::Inactive => "INACTIVE",
            AssessmentStatus::Banned => "BANNED",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AssessmentStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ACTIVE" => Ok(AssessmentStatus::Active),
            "INACTIVE" => Ok(AssessmentStatus::Inactive),
            "BANNED" => Ok(AssessmentStatus::Banned),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Represents the 'user_quiz_assessments' table in the database.
///
/// Lifecycle is derived from populated columns:
/// questions set => QUESTIONED, answers set => ANSWERED, ai_review set => REVIEWED.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserQuizAssessment {
    pub id: Uuid,
    pub uid: String,

    /// JSON-encoded question list, kept as the exact text that was persisted.
    pub questions: String,
    /// JSON-encoded answer list; empty until Submit.
    pub answers: String,
    pub ai_review: String,
    pub ai_detect_grade: String,

    #[sqlx(try_from = "String")]
    pub status: AssessmentStatus,

    pub create_id: Option<i64>,
    #[sqlx(rename = "create_dt")]
    pub created_at: DateTime<Utc>,
    pub modify_id: Option<i64>,
    #[sqlx(rename = "modify_dt")]
    pub modified_at: DateTime<Utc>,
    #[sqlx(rename = "deleted_dt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert payload. The repository assigns id, status and timestamps.
#[derive(Debug, Clone, Default)]
pub struct NewUserQuizAssessment {
    pub uid: String,
    pub questions: String,
    pub answers: String,
    pub ai_review: String,
    pub ai_detect_grade: String,
}

/// Partial update. `Some` writes the column, `None` leaves it alone.
///
/// The four text columns go through [`AssessmentPatch::text`], so an empty
/// string is treated as "skip": a text column can never be blanked by an update.
/// `questions` is only written while the stored value is still empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentPatch {
    pub questions: Option<String>,
    pub answers: Option<String>,
    pub ai_review: Option<String>,
    pub ai_detect_grade: Option<String>,
    pub status: Option<AssessmentStatus>,
    pub modify_id: Option<i64>,
}

impl AssessmentPatch {
    pub fn text(value: impl Into<String>) -> Option<String> {
        Some(value.into()).filter(|v| !v.is_empty())
    }

    pub fn answers(answers: impl Into<String>) -> Self {
        Self {
            answers: Self::text(answers),
            ..Default::default()
        }
    }

    pub fn review(ai_review: impl Into<String>, ai_detect_grade: impl Into<String>) -> Self {
        Self {
            ai_review: Self::text(ai_review),
            ai_detect_grade: Self::text(ai_detect_grade),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_none()
            && self.answers.is_none()
            && self.ai_review.is_none()
            && self.ai_detect_grade.is_none()
            && self.status.is_none()
            && self.modify_id.is_none()
    }
}

/// Sortable columns for history listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssessmentOrder {
    #[default]
    CreatedAt,
    ModifiedAt,
    Status,
}

impl AssessmentOrder {
    /// Unknown names fall back to creation time.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("modify_dt") | Some("modified_at") => AssessmentOrder::ModifiedAt,
            Some("status") => AssessmentOrder::Status,
            _ => AssessmentOrder::CreatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            AssessmentOrder::CreatedAt => "create_dt",
            AssessmentOrder::ModifiedAt => "modify_dt",
            AssessmentOrder::Status => "status",
        }
    }
}

/// Normalized listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAssessmentsParams {
    pub uid: String,
    pub page: u32,
    pub limit: u32,
    pub order_by: AssessmentOrder,
    pub order_desc: bool,
    pub take_all: bool,
}

impl ListAssessmentsParams {
    pub fn new(uid: impl Into<String>, page: u32, limit: u32) -> Self {
        Self {
            uid: uid.into(),
            page,
            limit,
            order_by: AssessmentOrder::CreatedAt,
            order_desc: true,
            take_all: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub skip: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `page` and `size` are clamped to at least 1; `take_all` returns everything on page 1.
    pub fn new(page: u32, size: u32, total_count: u64, take_all: bool) -> Self {
        let (page, size) = if take_all {
            (1, u32::try_from(total_count).unwrap_or(u32::MAX).max(1))
        } else {
            (page.max(1), size.max(1))
        };
        let skip = u64::from(page - 1) * u64::from(size);
        let total_pages = total_count.div_ceil(u64::from(size));

        Self {
            page,
            size,
            skip,
            total_count,
            total_pages,
        }
    }
}

/// DTO projection of a stored assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuizAssessmentResponse {
    pub id: String,
    pub uid: String,
    /// Decoded question list, or the raw text when it is not valid JSON.
    pub questions: serde_json::Value,
    pub answers: serde_json::Value,
    pub ai_review: String,
    pub ai_detect_grade: String,
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<UserQuizAssessment> for UserQuizAssessmentResponse {
    fn from(row: UserQuizAssessment) -> Self {
        Self {
            id: row.id.to_string(),
            uid: row.uid,
            questions: decode_json_column(row.questions),
            answers: decode_json_column(row.answers),
            ai_review: row.ai_review,
            ai_detect_grade: row.ai_detect_grade,
            status: row.status,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn decode_json_column(raw: String) -> serde_json::Value {
    if raw.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}
