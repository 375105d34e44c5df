// src/backend/mod.rs

//! Scheduler backend abstraction.
//!
//! The coordinator talks to the durable queue/scheduler service through the
//! traits in this module instead of any concrete client. This keeps the
//! lifecycle layer stateless and makes it easy to swap in an in-memory
//! backend in tests.
//!
//! - [`SchedulerBackend`] covers registration, lookup and cancellation of
//!   scheduled jobs.
//! - [`FailedQueue`] covers the dead-letter view (list / remove / requeue).
//! - [`QueueView`] covers the immediate execution lanes.
//! - [`Unconfigured`] implements all three and fails every call with
//!   [`TestlaneError::BackendUnavailable`]; it is what the CLI uses when no
//!   backend is configured, leaving only instant execution available.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::errors::{Result, TestlaneError};
use crate::request::RunRequest;

/// Keyword arguments bound to a job at registration time.
pub type Kwargs = Map<String, Value>;

/// Kwargs key under which a job's [`RunRequest`] is bound.
pub const RUN_ARGS_KEY: &str = "ox_test_args";

/// Older kwargs key still recognized when scanning the failed queue.
pub const LEGACY_ARGS_KEY: &str = "ox_herd_args";

/// Metadata key holding a registered job's recurrence expression.
pub const CRON_META_KEY: &str = "cron_string";

/// Callback identifier under which deferred runs are registered; backend
/// workers resolve it to the test-run entry point.
pub const RUN_TEST_CALLBACK: &str = "testlane.run_test";

/// Handle to a job known to the external backend.
///
/// A snapshot, not a live view: the backend may move the job between its
/// scheduled/queued/failed views at any time after this was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct JobHandle {
    /// Backend-assigned job identifier.
    pub id: String,
    /// Lane the job was registered or enqueued under.
    pub lane: String,
    /// Keyword arguments bound at registration.
    pub bound_kwargs: Kwargs,
    /// Backend metadata, including the optional recurrence expression.
    pub metadata: Kwargs,
}

impl JobHandle {
    /// Whether the bound kwargs carry a recognized run-args key.
    ///
    /// Used to separate this domain's jobs from unrelated entries sharing
    /// the same backend.
    pub fn has_run_args(&self) -> bool {
        self.bound_kwargs.contains_key(RUN_ARGS_KEY)
            || self.bound_kwargs.contains_key(LEGACY_ARGS_KEY)
    }

    /// Decode the bound [`RunRequest`], if one is present.
    ///
    /// Returns `Ok(None)` when no run-args key is bound, and an error when
    /// a key is present but does not decode.
    pub fn bound_request(&self) -> Result<Option<RunRequest>> {
        let value = self
            .bound_kwargs
            .get(RUN_ARGS_KEY)
            .or_else(|| self.bound_kwargs.get(LEGACY_ARGS_KEY));

        match value {
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
            None => Ok(None),
        }
    }

    /// The recurrence expression from the job's metadata, if any.
    pub fn cron_string(&self) -> Option<&str> {
        self.metadata.get(CRON_META_KEY).and_then(Value::as_str)
    }
}

/// Build the kwargs under which a request is bound to a job.
pub fn kwargs_for(request: &RunRequest) -> Result<Kwargs> {
    let mut kwargs = Kwargs::new();
    kwargs.insert(RUN_ARGS_KEY.to_string(), serde_json::to_value(request)?);
    Ok(kwargs)
}

/// Registration, lookup and cancellation of scheduled jobs.
pub trait SchedulerBackend: Send + Sync {
    /// Register a recurring job under `queue`, bound to `callback` with
    /// `kwargs`, firing per `cron`. `timeout` is forwarded opaquely.
    fn register_recurring(
        &self,
        cron: &str,
        callback: &str,
        kwargs: Kwargs,
        queue: &str,
        timeout: Option<Duration>,
    ) -> Result<JobHandle>;

    /// Enqueue `callback` for immediate execution under `queue`.
    ///
    /// The returned handle must report `lane == queue`; the coordinator
    /// treats a mismatch as a fatal backend invariant violation.
    fn enqueue_now(&self, callback: &str, kwargs: Kwargs, queue: &str) -> Result<JobHandle>;

    /// Fetch a registered job by id; absence is an error.
    fn fetch_by_id(&self, id: &str) -> Result<JobHandle>;

    /// All currently scheduled jobs.
    fn list_scheduled(&self) -> Result<Vec<JobHandle>>;

    /// Remove a job from the schedule.
    fn cancel(&self, job: &JobHandle) -> Result<()>;
}

/// The dead-letter view over runs that failed in a worker.
pub trait FailedQueue: Send + Sync {
    fn list_failed(&self) -> Result<Vec<JobHandle>>;

    /// Remove a failed job permanently.
    fn remove(&self, id: &str) -> Result<()>;

    /// Move a failed job back onto its queue.
    fn requeue(&self, id: &str) -> Result<JobHandle>;
}

/// Read-only view over jobs waiting in the immediate execution lanes.
pub trait QueueView: Send + Sync {
    fn list_queued(&self) -> Result<Vec<JobHandle>>;
}

/// Backend stand-in used when no scheduler service is configured.
///
/// Every operation fails with [`TestlaneError::BackendUnavailable`], so
/// callers fall back to instant execution, which needs no backend at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl SchedulerBackend for Unconfigured {
    fn register_recurring(
        &self,
        _cron: &str,
        _callback: &str,
        _kwargs: Kwargs,
        _queue: &str,
        _timeout: Option<Duration>,
    ) -> Result<JobHandle> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn enqueue_now(&self, _callback: &str, _kwargs: Kwargs, _queue: &str) -> Result<JobHandle> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn fetch_by_id(&self, _id: &str) -> Result<JobHandle> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn list_scheduled(&self) -> Result<Vec<JobHandle>> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn cancel(&self, _job: &JobHandle) -> Result<()> {
        Err(TestlaneError::BackendUnavailable)
    }
}

impl FailedQueue for Unconfigured {
    fn list_failed(&self) -> Result<Vec<JobHandle>> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn remove(&self, _id: &str) -> Result<()> {
        Err(TestlaneError::BackendUnavailable)
    }

    fn requeue(&self, _id: &str) -> Result<JobHandle> {
        Err(TestlaneError::BackendUnavailable)
    }
}

impl QueueView for Unconfigured {
    fn list_queued(&self) -> Result<Vec<JobHandle>> {
        Err(TestlaneError::BackendUnavailable)
    }
}
