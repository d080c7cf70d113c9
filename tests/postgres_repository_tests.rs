// tests/postgres_repository_tests.rs

use math_ai::{
    models::user_quiz_assessment::{AssessmentPatch, ListAssessmentsParams, NewUserQuizAssessment},
    repository::{AssessmentRepository, PgAssessmentRepository},
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Connects and migrates. Run with `cargo test -- --ignored` against a live database.
async fn repository() -> PgAssessmentRepository {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    PgAssessmentRepository::new(pool)
}

/// A uid unique to this test run, so runs do not see each other's rows.
fn fresh_uid() -> String {
    Uuid::new_v4().simple().to_string()[..20].to_string()
}

fn quiz(uid: &str) -> NewUserQuizAssessment {
    NewUserQuizAssessment {
        uid: uid.to_string(),
        questions: r#"[{"question_number":1,"question":"\\sqrt{4}"}]"#.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn create_then_find() {
    let repo = repository().await;
    let uid = fresh_uid();

    let created = repo.create(quiz(&uid)).await.unwrap();
    let found = repo.find_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(found.uid, uid);
    assert_eq!(found.questions, created.questions);
    assert!(found.answers.is_empty());
    assert!(found.deleted_at.is_none());

    repo.force_delete(created.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn update_skips_empty_fields_and_keeps_questions() {
    let repo = repository().await;
    let uid = fresh_uid();
    let created = repo.create(quiz(&uid)).await.unwrap();

    let affected = repo
        .update(created.id, AssessmentPatch::answers(r#"[{"question_number":1,"answer":"A"}]"#))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    // Empty review text is skipped; questions are never overwritten once set
    let patch = AssessmentPatch {
        questions: Some("[]".to_string()),
        ..AssessmentPatch::review("", "Grade 2")
    };
    repo.update(created.id, patch).await.unwrap();

    let row = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(row.questions, created.questions);
    assert!(row.answers.contains("\"A\""));
    assert!(row.ai_review.is_empty());
    assert_eq!(row.ai_detect_grade, "Grade 2");
    assert!(row.modified_at >= created.modified_at);

    assert_eq!(
        repo.update(created.id, AssessmentPatch::default()).await.unwrap(),
        0
    );

    repo.force_delete(created.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn list_paginates_and_hides_deleted() {
    let repo = repository().await;
    let uid = fresh_uid();
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(repo.create(quiz(&uid)).await.unwrap().id);
    }
    repo.delete(ids[0]).await.unwrap();

    let (rows, page) = repo
        .list_by_uid(&ListAssessmentsParams::new(uid.clone(), 1, 1))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages, 2);

    let (rows, _) = repo
        .list_by_uid(&ListAssessmentsParams::new(uid.clone(), 3, 1))
        .await
        .unwrap();
    assert!(rows.is_empty());

    // Soft-deleted rows are invisible to lookups and further updates
    assert!(repo.find_by_id(ids[0]).await.unwrap().is_none());
    assert_eq!(
        repo.update(ids[0], AssessmentPatch::answers("[]")).await.unwrap(),
        0
    );
    assert_eq!(repo.delete(ids[0]).await.unwrap(), 0);

    for id in ids {
        repo.force_delete(id).await.unwrap();
    }
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn long_detected_grade_is_stored() {
    let repo = repository().await;
    let uid = fresh_uid();
    let created = repo.create(quiz(&uid)).await.unwrap();

    // Graders sometimes explain their estimate at length
    let grade = format!("Grade 4. {}", "Strong on fractions, weak on radicals. ".repeat(12));
    assert!(grade.len() > 255);

    let affected = repo
        .update(created.id, AssessmentPatch::review("Review", grade.clone()))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let row = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(row.ai_review, "Review");
    assert_eq!(row.ai_detect_grade, grade);

    repo.force_delete(created.id).await.unwrap();
}
