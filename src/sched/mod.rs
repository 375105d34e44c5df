// src/sched/mod.rs

//! Job lifecycle coordination.
//!
//! The [`Coordinator`] is the routing layer between a [`RunRequest`] and
//! the external backend: instant requests run through the [`TestRunner`]
//! right away, deferred requests are registered with the scheduler
//! backend, and previously registered jobs can be launched, inspected,
//! cancelled, requeued or listed.
//!
//! The coordinator holds no job state of its own. Where a job currently
//! sits in its lifecycle is inferred from which backend view (scheduled,
//! queued, failed) contains its id, and every listing is an
//! eventually-consistent snapshot of a backend that may mutate
//! concurrently.

pub mod listing;

pub use listing::ScheduledRun;

use std::sync::Arc;

use tracing::info;

use crate::backend::{
    kwargs_for, FailedQueue, JobHandle, QueueView, SchedulerBackend, RUN_TEST_CALLBACK,
};
use crate::errors::{Result, TestlaneError};
use crate::exec::{StoredReport, TestRunner};
use crate::request::{RunMode, RunRequest};

/// What `schedule` did with a request.
#[derive(Debug)]
pub enum ScheduleOutcome {
    /// The request ran synchronously and its report was stored.
    Ran(StoredReport),
    /// The request was registered with the backend for recurring execution.
    Registered(JobHandle),
}

/// Stateless coordination layer over the scheduler backend views and the
/// test runner.
pub struct Coordinator {
    scheduler: Arc<dyn SchedulerBackend>,
    failed: Arc<dyn FailedQueue>,
    queues: Arc<dyn QueueView>,
    runner: TestRunner,
}

impl Coordinator {
    pub fn new(
        scheduler: Arc<dyn SchedulerBackend>,
        failed: Arc<dyn FailedQueue>,
        queues: Arc<dyn QueueView>,
        runner: TestRunner,
    ) -> Self {
        Self {
            scheduler,
            failed,
            queues,
            runner,
        }
    }

    /// Route a request to its execution strategy.
    ///
    /// `Instant` runs the test right now and returns its stored report;
    /// `Deferred` registers a recurring job with the backend. Deferred
    /// without a cron string fails before the backend is touched.
    pub fn schedule(&self, request: &RunRequest) -> Result<ScheduleOutcome> {
        match request.mode {
            RunMode::Instant => Ok(ScheduleOutcome::Ran(self.runner.execute(request)?)),
            RunMode::Deferred => Ok(ScheduleOutcome::Registered(self.register_deferred(request)?)),
        }
    }

    fn register_deferred(&self, request: &RunRequest) -> Result<JobHandle> {
        let cron = request
            .cron_string
            .as_deref()
            .ok_or(TestlaneError::MissingCronString)?;

        let kwargs = kwargs_for(request)?;
        let job = self.scheduler.register_recurring(
            cron,
            RUN_TEST_CALLBACK,
            kwargs,
            &request.queue_name,
            request.timeout,
        )?;

        info!(
            job = %job.id,
            queue = %request.queue_name,
            cron,
            run = %request.name,
            "registered recurring run"
        );
        Ok(job)
    }

    /// Launch a registered job immediately, in the queue it was registered
    /// under.
    ///
    /// The backend must bind the new job to that same lane; a mismatch is
    /// a fatal invariant violation (the backend and this layer disagree
    /// about routing), not an error the caller can handle.
    pub fn run_now(&self, job_id: &str) -> Result<JobHandle> {
        info!(job = %job_id, "preparing to launch job");

        let request = self.request_for_job(job_id)?;
        let queue = request.queue_name.clone();
        let kwargs = kwargs_for(&request)?;

        let new_job = self.scheduler.enqueue_now(RUN_TEST_CALLBACK, kwargs, &queue)?;
        assert_eq!(
            new_job.lane, queue,
            "backend enqueued job {} into lane '{}', expected '{}'",
            new_job.id, new_job.lane, queue
        );

        info!(job = %new_job.id, queue = %queue, run = %request.name, "launched job");
        Ok(new_job)
    }

    /// Recover the original request a job was registered with.
    ///
    /// The returned value is deserialized from the job's bound kwargs, so
    /// it is an owned copy: mutating it cannot touch the stored job.
    pub fn request_for_job(&self, job_id: &str) -> Result<RunRequest> {
        let job = self.scheduler.fetch_by_id(job_id)?;
        job.bound_request()?.ok_or_else(|| {
            TestlaneError::JobNotFound(format!("job {job_id} has no bound run request"))
        })
    }

    /// Remove a job from the schedule.
    pub fn cancel(&self, job: &JobHandle) -> Result<()> {
        self.scheduler.cancel(job)
    }

    /// Move a failed job back onto its queue.
    pub fn requeue(&self, job_id: &str) -> Result<JobHandle> {
        self.failed.requeue(job_id)
    }

    /// Remove a failed job permanently, returning a confirmation line.
    pub fn discard_failed(&self, job_id: &str) -> Result<String> {
        self.failed.remove(job_id)?;
        Ok(format!("Removed job {job_id}"))
    }

    /// Linear scan of the scheduled jobs for a matching id.
    ///
    /// No match is an empty result, not an error.
    pub fn find_scheduled(&self, job_id: &str) -> Result<Option<JobHandle>> {
        Ok(self
            .scheduler
            .list_scheduled()?
            .into_iter()
            .find(|job| job.id == job_id))
    }

    /// Failed jobs belonging to this scheduling domain.
    ///
    /// Entries whose kwargs carry no recognized run-args key are someone
    /// else's jobs on a shared backend and are filtered out.
    pub fn failed_runs(&self) -> Result<Vec<JobHandle>> {
        Ok(self
            .failed
            .list_failed()?
            .into_iter()
            .filter(JobHandle::has_run_args)
            .collect())
    }

    /// The recurring-schedule view: scheduled jobs with a bound request
    /// and a non-empty recurrence expression.
    ///
    /// Best effort: a malformed entry is logged and skipped, never aborts
    /// the listing.
    pub fn recurring_runs(&self) -> Result<Vec<ScheduledRun>> {
        Ok(self
            .scheduler
            .list_scheduled()?
            .into_iter()
            .filter_map(listing::try_extract)
            .collect())
    }

    /// All currently queued jobs, optionally restricted to a set of lanes.
    pub fn queued_runs(&self, allowed_queues: Option<&[String]>) -> Result<Vec<JobHandle>> {
        let jobs = self.queues.list_queued()?;
        match allowed_queues {
            None | Some([]) => Ok(jobs),
            Some(allowed) => Ok(jobs
                .into_iter()
                .filter(|job| allowed.contains(&job.lane))
                .collect()),
        }
    }
}
