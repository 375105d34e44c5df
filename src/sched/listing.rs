// src/sched/listing.rs

//! Best-effort extraction of the recurring-schedule view.

use tracing::{debug, warn};

use crate::backend::JobHandle;
use crate::request::RunRequest;

/// One scheduled recurring run, as shown in listings.
///
/// Pairs the recovered request with the display fields derived from the
/// backend's job: the recurrence expression and the job id. The request
/// itself stays untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledRun {
    pub request: RunRequest,
    /// Recurrence expression copied from the job's metadata.
    pub schedule: String,
    /// The backend's identifier for the registered job.
    pub job_id: String,
}

/// Extract the recurring-run view from one scheduled job.
///
/// Returns `None` for jobs that do not belong in the view:
/// - no bound run request (someone else's job on a shared backend),
/// - no recurrence expression (one-off launches land in the scheduled
///   view too, and are deliberately excluded here),
/// - a bound request that fails to decode, which is logged and skipped so
///   one malformed entry never aborts the whole listing.
pub fn try_extract(job: JobHandle) -> Option<ScheduledRun> {
    let request = match job.bound_request() {
        Ok(Some(request)) => request,
        Ok(None) => return None,
        Err(err) => {
            warn!(
                job = %job.id,
                error = %err,
                "skipping scheduled job with undecodable run request"
            );
            return None;
        }
    };

    match job.cron_string() {
        Some(cron) if !cron.is_empty() => Some(ScheduledRun {
            request,
            schedule: cron.to_string(),
            job_id: job.id,
        }),
        _ => {
            debug!(
                job = %job.id,
                "skipping scheduled job without a recurrence expression; probably a one-off launch"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{kwargs_for, Kwargs, CRON_META_KEY, RUN_ARGS_KEY};
    use crate::request::{RunMode, RunnerArgs};
    use serde_json::{json, Value};

    fn request() -> RunRequest {
        RunRequest {
            name: "nightly".to_string(),
            location: "file:///tests/nightly".to_string(),
            runner_args: RunnerArgs::default(),
            report_path: None,
            timeout: None,
            queue_name: "nightly-lane".to_string(),
            cron_string: Some("0 2 * * *".to_string()),
            mode: RunMode::Deferred,
        }
    }

    fn handle(metadata: Kwargs) -> JobHandle {
        JobHandle {
            id: "job-7".to_string(),
            lane: "nightly-lane".to_string(),
            bound_kwargs: kwargs_for(&request()).unwrap(),
            metadata,
        }
    }

    #[test]
    fn recurring_job_yields_a_view() {
        let mut meta = Kwargs::new();
        meta.insert(CRON_META_KEY.to_string(), json!("0 2 * * *"));

        let run = try_extract(handle(meta)).unwrap();
        assert_eq!(run.schedule, "0 2 * * *");
        assert_eq!(run.job_id, "job-7");
        assert_eq!(run.request, request());
    }

    #[test]
    fn job_without_recurrence_is_excluded() {
        assert!(try_extract(handle(Kwargs::new())).is_none());

        let mut meta = Kwargs::new();
        meta.insert(CRON_META_KEY.to_string(), json!(""));
        assert!(try_extract(handle(meta)).is_none());
    }

    #[test]
    fn undecodable_request_is_skipped_not_fatal() {
        let mut kwargs = Kwargs::new();
        kwargs.insert(RUN_ARGS_KEY.to_string(), Value::String("not a map".into()));
        let mut meta = Kwargs::new();
        meta.insert(CRON_META_KEY.to_string(), json!("* * * * *"));

        let job = JobHandle {
            id: "job-8".to_string(),
            lane: "ci".to_string(),
            bound_kwargs: kwargs,
            metadata: meta,
        };
        assert!(try_extract(job).is_none());
    }
}
