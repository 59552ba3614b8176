//! End-to-end job lifecycle tests

use pretty_assertions::assert_eq;
use reqforge_core::{Extractor, SpecSource};
use reqforge_jobs::{JobError, JobId, JobService, JobStatus, JobsConfig, PollError};
use reqforge_test_utils::{
    extractor_with, manager_employee_response, FaultyJobStore, ScriptedGenerator,
    COURSE_DESCRIPTION,
};
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> JobsConfig {
    JobsConfig::new()
        .with_poll_interval(Duration::from_millis(5))
        .with_poll_max_attempts(400)
}

#[tokio::test]
async fn offline_course_submission_completes() {
    let service = JobService::in_memory(Extractor::offline(), fast_config());

    let submission = service.submit(COURSE_DESCRIPTION).await.unwrap();
    assert_eq!(submission.status, JobStatus::Processing);

    let job = service.poller().wait(submission.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(matches!(job.source, Some(SpecSource::Fallback { .. })));

    let spec = job.result.unwrap();
    assert_eq!(spec.roles, vec!["Teacher", "Student", "Admin"]);
    let admin = spec.permissions_for("Admin").unwrap();
    for entity in spec.entity_names() {
        assert!(admin.can_edit.iter().any(|e| e == entity), "Admin cannot edit {entity}");
    }
}

#[tokio::test]
async fn live_response_is_repaired_before_storing() {
    let (extractor, generator) =
        extractor_with(ScriptedGenerator::responding(manager_employee_response()));
    let service = JobService::in_memory(extractor, fast_config());

    let id = service.submit("stock room").await.unwrap().id;
    let spec = service.poller().wait_for_spec(id).await.unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(spec.app_name, "Stock Room");
    let all = vec!["Product".to_owned(), "Supplier".to_owned()];
    let manager = spec.permissions_for("Manager").unwrap();
    assert_eq!(manager.can_view, all);
    assert_eq!(manager.can_edit, all);
    assert_eq!(spec.permissions_for("Employee").unwrap().can_view, all);
    assert_eq!(spec.editors().collect::<Vec<_>>(), vec!["Manager"]);

    let job = service.get_job(id).await.unwrap();
    assert_eq!(job.source, Some(SpecSource::Live { generator: "scripted".into() }));
}

#[tokio::test]
async fn generator_failure_still_completes_with_fallback() {
    let (extractor, _) = extractor_with(ScriptedGenerator::failing("quota exceeded"));
    let service = JobService::in_memory(extractor, fast_config());

    let id = service.submit("inventory of products").await.unwrap().id;
    let job = service.poller().wait(id).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.result.unwrap().app_name, "Inventory Manager");
}

#[tokio::test]
async fn storing_result_fails_job_with_verbatim_message() {
    let store = Arc::new(FaultyJobStore::failing_on(JobStatus::Completed, "disk quota exceeded"));
    let service = JobService::new(store, Extractor::offline(), fast_config());

    let id = service.submit("a todo app").await.unwrap().id;
    let job = service.poller().wait(id).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("disk quota exceeded"));
    assert!(job.result.is_none());
}

#[tokio::test]
async fn marking_processing_fails_job_from_pending() {
    let store = Arc::new(FaultyJobStore::failing_on(JobStatus::Processing, "connection reset"));
    let service = JobService::new(store, Extractor::offline(), fast_config());

    let id = service.submit("a todo app").await.unwrap().id;
    match service.poller().wait_for_spec(id).await {
        Err(PollError::JobFailed { message, .. }) => assert_eq!(message, "connection reset"),
        other => panic!("expected failed job, got {other:?}"),
    }
}

#[tokio::test]
async fn whitespace_submission_is_rejected() {
    let service = JobService::in_memory(Extractor::offline(), fast_config());
    assert!(matches!(service.submit(" \n\t ").await, Err(JobError::EmptyInput)));
    assert!(service.list_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn never_finishing_job_times_out_distinctly() {
    let (extractor, _) = extractor_with(ScriptedGenerator::hanging());
    let config = JobsConfig::new()
        .with_poll_interval(Duration::from_millis(2))
        .with_poll_max_attempts(5);
    let service = JobService::in_memory(extractor, config);

    let id = service.submit("anything").await.unwrap().id;
    let err = service.poller().wait(id).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(!matches!(err, PollError::JobFailed { .. }));
    assert!(!service.get_job(id).await.unwrap().is_terminal());
    assert!(service.is_in_flight(id));
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let (extractor, generator) = extractor_with(ScriptedGenerator::hanging());
    let service = JobService::in_memory(extractor, fast_config());
    let id = JobId::new();

    service.submit_with_id(id, "first").await.unwrap();
    assert!(matches!(
        service.submit_with_id(id, "second").await,
        Err(JobError::Duplicate(dup)) if dup == id
    ));
    assert_eq!(service.get_job(id).await.unwrap().input_text, "first");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(generator.calls() <= 1);
}

#[tokio::test]
async fn resubmitting_a_finished_id_is_rejected() {
    let service = JobService::in_memory(Extractor::offline(), fast_config());
    let id = JobId::new();

    service.submit_with_id(id, "inventory").await.unwrap();
    service.poller().wait(id).await.unwrap();
    assert!(!service.is_in_flight(id));

    assert!(matches!(
        service.submit_with_id(id, "inventory again").await,
        Err(JobError::Duplicate(_))
    ));
    assert_eq!(service.get_job(id).await.unwrap().status, JobStatus::Completed);
}

#[tokio::test]
async fn listing_is_newest_first_and_capped() {
    let service = JobService::in_memory(Extractor::offline(), fast_config().with_list_limit(2));
    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        ids.push(service.submit(text).await.unwrap().id);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let listed: Vec<JobId> = service.list_jobs().await.unwrap().iter().map(|job| job.id).collect();
    assert_eq!(listed, vec![ids[2], ids[1]]);
}

#[tokio::test]
async fn concurrency_limit_still_finishes_every_job() {
    let service = JobService::in_memory(
        Extractor::offline(),
        fast_config().with_max_concurrent_jobs(1),
    );
    let mut ids = Vec::new();
    for text in ["course for students", "product inventory", "crm"] {
        ids.push(service.submit(text).await.unwrap().id);
    }

    let poller = service.poller();
    for id in ids {
        assert_eq!(poller.wait(id).await.unwrap().status, JobStatus::Completed);
    }
}
