use chrono::{Duration, Utc};

use filegate::application::ports::{JobRepository, RepositoryError};
use filegate::domain::{FileId, JobStatus, UploadJob, UserId};

use crate::helpers::test_postgres::TestPostgres;

#[tokio::test]
#[ignore = "requires docker"]
async fn given_new_job_when_creating_and_retrieving_then_job_is_persisted() {
    let test_pg = TestPostgres::new().await;
    let job = UploadJob::new(UserId::new("alice"));

    test_pg
        .job_repository
        .create(&job)
        .await
        .expect("Failed to create job");

    let retrieved = test_pg
        .job_repository
        .get(job.id)
        .await
        .expect("Failed to retrieve job")
        .expect("Job not found");

    assert_eq!(retrieved.id, job.id);
    assert_eq!(retrieved.created_by, job.created_by);
    assert_eq!(retrieved.status, JobStatus::Pending);
    assert!(retrieved.file_id.is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_scanned_job_when_updating_then_status_and_file_are_persisted() {
    let test_pg = TestPostgres::new().await;
    let mut job = UploadJob::new(UserId::new("alice"));
    test_pg.job_repository.create(&job).await.unwrap();

    let file_id = FileId::new();
    job.start_upload().unwrap();
    job.mark_uploaded(file_id.clone(), Some("scan.pdf".to_string()))
        .unwrap();
    job.start_scan().unwrap();
    job.fail("file contains malware").unwrap();
    test_pg.job_repository.update(&job).await.unwrap();

    let retrieved = test_pg
        .job_repository
        .get_by_file_id(&file_id)
        .await
        .unwrap()
        .expect("Job not found by file id");

    assert_eq!(retrieved.id, job.id);
    assert_eq!(retrieved.status, JobStatus::Failed);
    assert_eq!(retrieved.filename.as_deref(), Some("scan.pdf"));
    assert_eq!(retrieved.error.as_deref(), Some("file contains malware"));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_jobs_in_several_statuses_when_listing_by_status_then_filters() {
    let test_pg = TestPostgres::new().await;

    let pending = UploadJob::new(UserId::new("alice"));
    let mut scanning = UploadJob::new(UserId::new("bob"));
    test_pg.job_repository.create(&pending).await.unwrap();
    test_pg.job_repository.create(&scanning).await.unwrap();

    scanning.start_upload().unwrap();
    scanning.mark_uploaded(FileId::new(), None).unwrap();
    scanning.start_scan().unwrap();
    scanning.updated_at = Utc::now() - Duration::minutes(10);
    test_pg.job_repository.update(&scanning).await.unwrap();

    let found = test_pg
        .job_repository
        .get_by_status(JobStatus::Scanning)
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, scanning.id);
    assert!(found[0].updated_at < Utc::now() - Duration::minutes(9));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_duplicate_job_id_when_creating_then_returns_constraint_violation() {
    let test_pg = TestPostgres::new().await;
    let job = UploadJob::new(UserId::new("alice"));
    test_pg.job_repository.create(&job).await.unwrap();

    let result = test_pg.job_repository.create(&job).await;

    assert!(matches!(
        result,
        Err(RepositoryError::ConstraintViolation(_))
    ));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_migrated_database_when_querying_table_then_it_exists() {
    let test_pg = TestPostgres::new().await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM upload_jobs")
        .fetch_one(&test_pg.pool)
        .await
        .unwrap();

    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_stored_version_when_updating_conditionally_then_only_first_writer_wins() {
    let test_pg = TestPostgres::new().await;
    let job = UploadJob::new(UserId::new("alice"));
    test_pg.job_repository.create(&job).await.unwrap();
    let read = test_pg
        .job_repository
        .get(job.id)
        .await
        .unwrap()
        .expect("Job not found")
        .version();

    let mut first = job.clone();
    first.start_upload().unwrap();
    let mut second = job.clone();
    second.start_upload().unwrap();
    second.fail("client went away").unwrap();

    let first_written = test_pg.job_repository.update_if(&first, read).await.unwrap();
    let second_written = test_pg
        .job_repository
        .update_if(&second, read)
        .await
        .unwrap();

    assert!(first_written);
    assert!(!second_written);
    let stored = test_pg.job_repository.get(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Uploading);
    assert_eq!(stored.version(), first.version());
}
