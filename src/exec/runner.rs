// src/exec/runner.rs

//! Synchronous execution of one test run.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::errors::{Result, TestlaneError};
use crate::report::{
    report_name, ReportStore, CMD_LINE_KEY, CREATED_AT_KEY, REPORT_ENVELOPE_KEY, URL_KEY,
};
use crate::request::{file_location_path, RunRequest};

/// Outcome of a completed, stored test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReport {
    /// Name the report was stored under.
    pub name: String,
}

/// Runs the test command for one request and records its report.
pub struct TestRunner {
    /// Test-runner program invoked for every run.
    program: PathBuf,
    store: Arc<dyn ReportStore>,
}

impl TestRunner {
    pub fn new(program: impl Into<PathBuf>, store: Arc<dyn ReportStore>) -> Self {
        Self {
            program: program.into(),
            store,
        }
    }

    /// Execute one run synchronously.
    ///
    /// The location scheme is validated before anything else; a non-`file`
    /// location aborts with no subprocess spawned and no store write.
    ///
    /// A failing test process is not an execution error: the report file
    /// carries the per-test outcomes, and the exit status is only logged.
    /// A missing or malformed report, and any store failure, propagate.
    pub fn execute(&self, request: &RunRequest) -> Result<StoredReport> {
        let target = file_location_path(&request.location)?;

        // When no explicit destination is given, the raw report lives in a
        // temp file whose drop at the end of this call is the cleanup --
        // it happens whether or not storage succeeded.
        let (raw_path, _transient): (PathBuf, Option<NamedTempFile>) = match &request.report_path {
            Some(path) => (path.clone(), None),
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix("testlane-report-")
                    .suffix(".json")
                    .tempfile()?;
                debug!(path = %tmp.path().display(), "using transient raw-report path");
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };

        let mut cmd_line = vec![
            target.display().to_string(),
            "--json-report-to".to_string(),
            raw_path.display().to_string(),
            "-v".to_string(),
        ];
        cmd_line.extend(request.runner_args.tokenize()?);

        info!(
            run = %request.name,
            runner = %self.program.display(),
            ?cmd_line,
            "running test command"
        );

        let status = Command::new(&self.program).args(&cmd_line).status()?;
        if !status.success() {
            // Test failures land in the report, not here.
            warn!(
                run = %request.name,
                exit = status.code().unwrap_or(-1),
                "test runner exited non-zero"
            );
        }

        self.store_report(request, &raw_path, &cmd_line)
    }

    /// Read the raw report, attach run context, derive the unique name and
    /// persist the payload.
    fn store_report(
        &self,
        request: &RunRequest,
        raw_path: &PathBuf,
        cmd_line: &[String],
    ) -> Result<StoredReport> {
        let contents = std::fs::read_to_string(raw_path)?;
        let raw: Value = serde_json::from_str(&contents)?;

        let mut report = raw.get(REPORT_ENVELOPE_KEY).cloned().ok_or_else(|| {
            TestlaneError::MalformedReport(format!(
                "raw report at {} has no '{REPORT_ENVELOPE_KEY}' object",
                raw_path.display()
            ))
        })?;

        let obj = report.as_object_mut().ok_or_else(|| {
            TestlaneError::MalformedReport(format!(
                "'{REPORT_ENVELOPE_KEY}' in {} is not an object",
                raw_path.display()
            ))
        })?;

        obj.insert(URL_KEY.to_string(), Value::String(request.location.clone()));
        obj.insert(CMD_LINE_KEY.to_string(), serde_json::to_value(cmd_line)?);

        let created_at = obj
            .get(CREATED_AT_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TestlaneError::MalformedReport(format!(
                    "report has no '{CREATED_AT_KEY}' timestamp"
                ))
            })?
            .to_string();

        let name = report_name(&request.name, &created_at)?;
        self.store.put(&name, &report)?;

        info!(run = %request.name, report = %name, "report stored");
        Ok(StoredReport { name })
    }
}
