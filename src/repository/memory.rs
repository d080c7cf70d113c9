// src/repository/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user_quiz_assessment::{
        AssessmentOrder, AssessmentPatch, AssessmentStatus, ListAssessmentsParams,
        NewUserQuizAssessment, Pagination, UserQuizAssessment,
    },
    repository::AssessmentRepository,
};

/// In-process store with the same semantics as the PostgreSQL repository.
/// Used when no database is configured, and by the test suites.
#[derive(Default)]
pub struct MemoryAssessmentRepository {
    rows: RwLock<Vec<UserQuizAssessment>>,
}

impl MemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw row lookup that ignores soft deletion.
    pub async fn raw(&self, id: Uuid) -> Option<UserQuizAssessment> {
        self.rows.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Number of stored rows, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AssessmentRepository for MemoryAssessmentRepository {
    async fn create(&self, new: NewUserQuizAssessment) -> Result<UserQuizAssessment, AppError> {
        let now = Utc::now();
        let row = UserQuizAssessment {
            id: Uuid::new_v4(),
            uid: new.uid,
            questions: new.questions,
            answers: new.answers,
            ai_review: new.ai_review,
            ai_detect_grade: new.ai_detect_grade,
            status: AssessmentStatus::Active,
            create_id: None,
            created_at: now,
            modify_id: None,
            modified_at: now,
            deleted_at: None,
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserQuizAssessment>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.id == id && r.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, id: Uuid, patch: AssessmentPatch) -> Result<u64, AppError> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut rows = self.rows.write().await;
        let Some(row) = rows
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
        else {
            return Ok(0);
        };

        if let Some(questions) = patch.questions {
            if row.questions.is_empty() {
                row.questions = questions;
            }
        }
        if let Some(answers) = patch.answers {
            row.answers = answers;
        }
        if let Some(ai_review) = patch.ai_review {
            row.ai_review = ai_review;
        }
        if let Some(ai_detect_grade) = patch.ai_detect_grade {
            row.ai_detect_grade = ai_detect_grade;
        }
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(modify_id) = patch.modify_id {
            row.modify_id = Some(modify_id);
        }
        row.modified_at = Utc::now();

        Ok(1)
    }

    async fn list_by_uid(
        &self,
        params: &ListAssessmentsParams,
    ) -> Result<(Vec<UserQuizAssessment>, Pagination), AppError> {
        let rows = self.rows.read().await;
        let mut owned: Vec<UserQuizAssessment> = rows
            .iter()
            .filter(|r| r.uid == params.uid && r.deleted_at.is_none())
            .cloned()
            .collect();
        drop(rows);

        let pagination = Pagination::new(
            params.page,
            params.limit,
            owned.len() as u64,
            params.take_all,
        );

        owned.sort_by(|a, b| {
            // Same (column, id) ordering as the Postgres query
            let ordering = match params.order_by {
                AssessmentOrder::CreatedAt => a.created_at.cmp(&b.created_at),
                AssessmentOrder::ModifiedAt => a.modified_at.cmp(&b.modified_at),
                AssessmentOrder::Status => a.status.as_str().cmp(b.status.as_str()),
            }
            .then_with(|| a.id.cmp(&b.id));
            if params.order_desc { ordering.reverse() } else { ordering }
        });

        let skip = usize::try_from(pagination.skip).unwrap_or(usize::MAX);
        let page = owned
            .into_iter()
            .skip(skip)
            .take(pagination.size as usize)
            .collect();

        Ok((page, pagination))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut rows = self.rows.write().await;
        match rows
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
        {
            Some(row) => {
                let now = Utc::now();
                row.deleted_at = Some(now);
                row.modified_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn force_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok((before - rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn new_row(uid: &str, questions: &str) -> NewUserQuizAssessment {
        NewUserQuizAssessment {
            uid: uid.to_string(),
            questions: questions.to_string(),
            ..Default::default()
        }
    }

    async fn seed(repo: &MemoryAssessmentRepository, uid: &str, n: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            ids.push(repo.create(new_row(uid, &format!("[{i}]"))).await.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn create_defaults() {
        let repo = MemoryAssessmentRepository::new();
        let row = repo.create(new_row("u1", "[]")).await.unwrap();

        assert_eq!(row.status, AssessmentStatus::Active);
        assert!(row.answers.is_empty());
        assert!(row.ai_review.is_empty());
        assert_eq!(repo.find_by_id(row.id).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn pagination_covers_every_row_exactly_once() {
        for n in [0usize, 1, 9, 10, 11, 25] {
            for k in [1u32, 3, 10] {
                let repo = MemoryAssessmentRepository::new();
                let ids: HashSet<Uuid> = seed(&repo, "U", n).await.into_iter().collect();
                seed(&repo, "someone-else", 2).await;

                let expected_pages = n.div_ceil(k as usize);
                let mut seen = HashSet::new();
                for page in 1..=expected_pages as u32 {
                    let (items, meta) = repo
                        .list_by_uid(&ListAssessmentsParams::new("U", page, k))
                        .await
                        .unwrap();
                    assert!(items.len() <= k as usize);
                    assert_eq!(meta.total_count, n as u64);
                    assert_eq!(meta.total_pages, expected_pages as u64);
                    for item in items {
                        assert!(seen.insert(item.id), "duplicate row across pages");
                    }
                }
                assert_eq!(seen, ids, "n={n} k={k}");
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn pages_partition_the_owned_rows(n in 0usize..60, k in 1u32..15, desc in any::<bool>()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let (ids, seen) = runtime.block_on(async {
                let repo = MemoryAssessmentRepository::new();
                let ids: HashSet<Uuid> = seed(&repo, "U", n).await.into_iter().collect();
                seed(&repo, "other", 3).await;

                let mut seen = Vec::new();
                for page in 1..=n.div_ceil(k as usize) as u32 {
                    let mut params = ListAssessmentsParams::new("U", page, k);
                    params.order_desc = desc;
                    let (items, meta) = repo.list_by_uid(&params).await.unwrap();
                    assert!(items.len() <= k as usize);
                    assert_eq!(meta.total_count, n as u64);
                    seen.extend(items.into_iter().map(|row| row.id));
                }
                (ids, seen)
            });

            prop_assert_eq!(seen.len(), n);
            prop_assert_eq!(seen.into_iter().collect::<HashSet<_>>(), ids);
        }
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_id_order() {
        let repo = MemoryAssessmentRepository::new();
        let mut ids = seed(&repo, "U", 6).await;
        {
            let mut rows = repo.rows.write().await;
            let stamp = rows[0].created_at;
            for row in rows.iter_mut() {
                row.created_at = stamp;
            }
        }
        ids.sort();

        let mut listed = Vec::new();
        for page in 1..=3 {
            let (items, _) = repo
                .list_by_uid(&ListAssessmentsParams::new("U", page, 2))
                .await
                .unwrap();
            listed.extend(items.into_iter().map(|row| row.id));
        }
        ids.reverse();
        assert_eq!(listed, ids);

        let mut params = ListAssessmentsParams::new("U", 1, 10);
        params.order_desc = false;
        let (items, _) = repo.list_by_uid(&params).await.unwrap();
        ids.reverse();
        assert_eq!(items.into_iter().map(|row| row.id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn take_all_returns_everything() {
        let repo = MemoryAssessmentRepository::new();
        seed(&repo, "U", 13).await;

        let mut params = ListAssessmentsParams::new("U", 3, 5);
        params.take_all = true;
        let (items, meta) = repo.list_by_uid(&params).await.unwrap();

        assert_eq!(items.len(), 13);
        assert_eq!((meta.page, meta.size, meta.skip, meta.total_pages), (1, 13, 0, 1));
    }

    #[tokio::test]
    async fn newest_first_by_default() {
        let repo = MemoryAssessmentRepository::new();
        seed(&repo, "U", 5).await;

        let (items, _) = repo
            .list_by_uid(&ListAssessmentsParams::new("U", 1, 10))
            .await
            .unwrap();
        assert!(items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn update_skips_none_and_keeps_questions() {
        let repo = MemoryAssessmentRepository::new();
        let row = repo.create(new_row("u1", "[1]")).await.unwrap();

        let patch = AssessmentPatch {
            questions: Some("[2]".into()),
            answers: AssessmentPatch::text("[{\"question_number\":1,\"answer\":\"B\"}]"),
            ..Default::default()
        };
        assert_eq!(repo.update(row.id, patch).await.unwrap(), 1);

        let stored = repo.find_by_id(row.id).await.unwrap().unwrap();
        assert_eq!(stored.questions, "[1]");
        assert!(stored.answers.contains("\"B\""));
        assert!(stored.ai_review.is_empty());

        assert_eq!(repo.update(row.id, AssessmentPatch::review("", "")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn soft_delete_hides_row_and_force_delete_removes_it() {
        let repo = MemoryAssessmentRepository::new();
        let row = repo.create(new_row("U", "[]")).await.unwrap();

        assert_eq!(repo.delete(row.id).await.unwrap(), 1);
        assert_eq!(repo.delete(row.id).await.unwrap(), 0);
        assert!(repo.find_by_id(row.id).await.unwrap().is_none());
        let (items, meta) = repo
            .list_by_uid(&ListAssessmentsParams::new("U", 1, 10))
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(meta.total_count, 0);
        assert_eq!(
            repo.update(row.id, AssessmentPatch::answers("[]")).await.unwrap(),
            0
        );
        assert!(repo.raw(row.id).await.is_some());

        assert_eq!(repo.force_delete(row.id).await.unwrap(), 1);
        assert!(repo.raw(row.id).await.is_none());
        assert!(repo.is_empty().await);
    }
}
