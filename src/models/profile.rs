// src/models/profile.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_GRADE: &str = "Grade 1";
pub const DEFAULT_SEMESTER: &str = "Semester 1";

/// The slice of a student profile the quiz prompts care about.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub grade: String,
    pub semester: String,
}

impl UserProfile {
    /// Neutral profile used when the student has not filled theirs in.
    pub fn neutral(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            grade: DEFAULT_GRADE.to_string(),
            semester: DEFAULT_SEMESTER.to_string(),
        }
    }
}
