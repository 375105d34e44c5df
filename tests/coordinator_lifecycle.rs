// tests/coordinator_lifecycle.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use testlane::backend::RUN_TEST_CALLBACK;
use testlane::errors::TestlaneError;
use testlane::exec::TestRunner;
use testlane::request::RunRequest;
use testlane::sched::{Coordinator, ScheduleOutcome};
use testlane_test_utils::builders::{foreign_job, job_with_request, RunRequestBuilder};
use testlane_test_utils::init_tracing;
use testlane_test_utils::memory_backend::MemoryBackend;
use testlane_test_utils::memory_store::MemoryReportStore;

type TestResult = Result<(), Box<dyn Error>>;

/// Coordinator over a shared in-memory backend.
///
/// The runner program is never spawned by these tests; every request here
/// is deferred or operates on already registered jobs.
fn coordinator(backend: &MemoryBackend) -> Coordinator {
    let backend = Arc::new(backend.clone());
    let runner = TestRunner::new("true", Arc::new(MemoryReportStore::new()));
    Coordinator::new(backend.clone(), backend.clone(), backend, runner)
}

fn deferred_request(name: &str) -> RunRequest {
    RunRequestBuilder::new(name)
        .queue("nightly-lane")
        .cron("0 2 * * *")
        .timeout_secs(600)
        .deferred()
        .build()
}

#[test]
fn deferred_request_registers_a_recurring_job() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let outcome = coordinator.schedule(&deferred_request("nightly"))?;
    let job = match outcome {
        ScheduleOutcome::Registered(job) => job,
        other => panic!("expected a registered job, got {other:?}"),
    };

    assert_eq!(job.lane, "nightly-lane");
    assert!(job.has_run_args());

    let registrations = backend.registrations();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].cron, "0 2 * * *");
    assert_eq!(registrations[0].callback, RUN_TEST_CALLBACK);
    assert_eq!(registrations[0].queue, "nightly-lane");
    assert_eq!(registrations[0].timeout, Some(Duration::from_secs(600)));
    Ok(())
}

#[test]
fn registered_handle_round_trips_to_the_original_request() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    let job = match coordinator.schedule(&request)? {
        ScheduleOutcome::Registered(job) => job,
        other => panic!("expected a registered job, got {other:?}"),
    };

    // The id handed back at registration is enough to recover the request.
    let recovered = coordinator.request_for_job(&job.id)?;
    assert_eq!(recovered, request);
    Ok(())
}

#[test]
fn deferred_request_without_cron_fails_before_backend() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = RunRequestBuilder::new("nightly")
        .queue("nightly-lane")
        .deferred()
        .build();

    let err = coordinator.schedule(&request).unwrap_err();
    assert!(matches!(err, TestlaneError::MissingCronString));

    // The backend was never touched.
    assert!(backend.registrations().is_empty());
    assert!(backend.scheduled_ids().is_empty());
    Ok(())
}

#[test]
fn launch_enqueues_on_the_registered_queue() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_scheduled(job_with_request("job-a", "nightly-lane", &request));

    let launched = coordinator.run_now("job-a")?;
    assert_eq!(launched.lane, "nightly-lane");
    assert_ne!(launched.id, "job-a");

    // The new job carries the same bound request.
    let bound = launched.bound_request()?.unwrap();
    assert_eq!(bound, request);
    assert_eq!(backend.queued_ids(), vec![launched.id]);
    Ok(())
}

#[test]
#[should_panic(expected = "expected 'nightly-lane'")]
fn launch_panics_when_backend_misroutes_the_job() {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_scheduled(job_with_request("job-a", "nightly-lane", &request));
    backend.misroute_enqueues_to("somewhere-else");

    let _ = coordinator.run_now("job-a");
}

#[test]
fn recovered_request_is_an_independent_copy() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_scheduled(job_with_request("job-a", "nightly-lane", &request));

    let mut first = coordinator.request_for_job("job-a")?;
    first.name = "mutated".to_string();
    first.queue_name = "elsewhere".to_string();

    let second = coordinator.request_for_job("job-a")?;
    assert_eq!(second, request);
    Ok(())
}

#[test]
fn request_for_unknown_job_is_not_found() {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let err = coordinator.request_for_job("nope").unwrap_err();
    assert!(matches!(err, TestlaneError::JobNotFound(_)));
}

#[test]
fn request_for_foreign_job_is_not_found() {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    backend.seed_scheduled(foreign_job("job-x", "ci"));

    let err = coordinator.request_for_job("job-x").unwrap_err();
    assert!(matches!(err, TestlaneError::JobNotFound(_)));
}

#[test]
fn cancel_removes_the_job_from_the_schedule() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_scheduled(job_with_request("job-a", "nightly-lane", &request));

    let job = coordinator.find_scheduled("job-a")?.unwrap();
    coordinator.cancel(&job)?;

    assert!(backend.scheduled_ids().is_empty());
    assert!(coordinator.find_scheduled("job-a")?.is_none());
    Ok(())
}

#[test]
fn find_scheduled_misses_return_none_not_error() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    assert!(coordinator.find_scheduled("ghost")?.is_none());
    Ok(())
}

#[test]
fn requeue_moves_a_failed_job_back_onto_its_queue() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_failed(job_with_request("job-f", "nightly-lane", &request));

    let job = coordinator.requeue("job-f")?;
    assert_eq!(job.id, "job-f");
    assert!(backend.failed_ids().is_empty());
    assert_eq!(backend.queued_ids(), vec!["job-f".to_string()]);
    Ok(())
}

#[test]
fn discard_failed_confirms_the_removal() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    backend.seed_failed(job_with_request(
        "job-f",
        "ci",
        &deferred_request("nightly"),
    ));

    let message = coordinator.discard_failed("job-f")?;
    assert_eq!(message, "Removed job job-f");
    assert!(backend.failed_ids().is_empty());

    let err = coordinator.discard_failed("job-f").unwrap_err();
    assert!(matches!(err, TestlaneError::JobNotFound(_)));
    Ok(())
}

#[test]
fn failed_listing_excludes_foreign_jobs() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    backend.seed_failed(job_with_request(
        "job-f",
        "ci",
        &deferred_request("nightly"),
    ));
    backend.seed_failed(foreign_job("job-x", "ci"));

    let failed = coordinator.failed_runs()?;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, "job-f");
    Ok(())
}

#[test]
fn queued_listing_filters_by_allowed_lanes() -> TestResult {
    init_tracing();
    let backend = MemoryBackend::new();
    let coordinator = coordinator(&backend);

    let request = deferred_request("nightly");
    backend.seed_queued(job_with_request("job-1", "ci", &request));
    backend.seed_queued(job_with_request("job-2", "nightly-lane", &request));
    backend.seed_queued(job_with_request("job-3", "other", &request));

    let allowed = vec!["ci".to_string(), "nightly-lane".to_string()];
    let queued = coordinator.queued_runs(Some(&allowed))?;
    let ids: Vec<&str> = queued.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["job-1", "job-2"]);

    // No restriction shows every lane.
    assert_eq!(coordinator.queued_runs(None)?.len(), 3);
    assert_eq!(coordinator.queued_runs(Some(&[]))?.len(), 3);
    Ok(())
}
