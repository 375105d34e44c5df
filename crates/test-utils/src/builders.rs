#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use testlane::backend::{kwargs_for, JobHandle, Kwargs, CRON_META_KEY};
use testlane::request::{RunMode, RunRequest, RunnerArgs};

/// Builder for `RunRequest` to simplify test setup.
pub struct RunRequestBuilder {
    request: RunRequest,
}

impl RunRequestBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            request: RunRequest {
                name: name.to_string(),
                location: format!("file:///tests/{name}"),
                runner_args: RunnerArgs::default(),
                report_path: None,
                timeout: None,
                queue_name: "default".to_string(),
                cron_string: None,
                mode: RunMode::Instant,
            },
        }
    }

    pub fn location(mut self, location: &str) -> Self {
        self.request.location = location.to_string();
        self
    }

    pub fn raw_args(mut self, args: &str) -> Self {
        self.request.runner_args = RunnerArgs::Raw(args.to_string());
        self
    }

    pub fn argv_args(mut self, args: &[&str]) -> Self {
        self.request.runner_args =
            RunnerArgs::Argv(args.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.report_path = Some(path.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.request.timeout = Some(Duration::from_secs(secs));
        self
    }

    pub fn queue(mut self, queue: &str) -> Self {
        self.request.queue_name = queue.to_string();
        self
    }

    pub fn cron(mut self, cron: &str) -> Self {
        self.request.cron_string = Some(cron.to_string());
        self
    }

    pub fn deferred(mut self) -> Self {
        self.request.mode = RunMode::Deferred;
        self
    }

    pub fn build(self) -> RunRequest {
        self.request
    }
}

/// A job handle bound to `request`, as the backend would hand it out.
pub fn job_with_request(id: &str, lane: &str, request: &RunRequest) -> JobHandle {
    let mut metadata = Kwargs::new();
    if let Some(cron) = &request.cron_string {
        metadata.insert(
            CRON_META_KEY.to_string(),
            serde_json::Value::String(cron.clone()),
        );
    }

    JobHandle {
        id: id.to_string(),
        lane: lane.to_string(),
        bound_kwargs: kwargs_for(request).expect("request must serialize"),
        metadata,
    }
}

/// A job handle with arbitrary kwargs, for entries that are not ours.
pub fn foreign_job(id: &str, lane: &str) -> JobHandle {
    let mut kwargs = Kwargs::new();
    kwargs.insert(
        "other_args".to_string(),
        serde_json::Value::String("unrelated".to_string()),
    );

    JobHandle {
        id: id.to_string(),
        lane: lane.to_string(),
        bound_kwargs: kwargs,
        metadata: Kwargs::new(),
    }
}
