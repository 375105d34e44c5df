// src/request.rs

//! The test-run request value object.
//!
//! A [`RunRequest`] describes exactly one test-run family: what to test,
//! how to invoke the runner, and how/where the run should be scheduled.
//! It is constructed by the caller, serialized into a job's bound kwargs at
//! registration time, and never mutated afterwards. Recovering a request
//! from a stored job deserializes a fresh owned value, so aliasing the
//! stored job's arguments is impossible by construction.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TestlaneError};

/// How a request should be executed.
///
/// - `Instant`: run the test synchronously, right now, in-process.
/// - `Deferred`: register the run with the external scheduler backend for
///   recurring execution (requires a cron string).
///
/// This is a closed set: there is deliberately no "enqueue once for later"
/// mode. A one-shot run either happens now or is launched from an already
/// registered job via the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Instant,
    Deferred,
}

/// Extra arguments forwarded to the test-runner subprocess.
///
/// Either a raw shell-style string (tokenized with shell-word rules before
/// use) or an already-tokenized argv (passed through untouched). Untagged,
/// so both `"-k smoke -x"` and `["-k", "smoke", "-x"]` deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunnerArgs {
    Raw(String),
    Argv(Vec<String>),
}

impl Default for RunnerArgs {
    fn default() -> Self {
        RunnerArgs::Argv(Vec::new())
    }
}

impl RunnerArgs {
    /// Tokenize into an argv fragment.
    ///
    /// Raw strings are split with shell-word rules; an unterminated quote
    /// or trailing backslash is an error. Pre-tokenized argv is returned
    /// as-is.
    pub fn tokenize(&self) -> Result<Vec<String>> {
        match self {
            RunnerArgs::Argv(argv) => Ok(argv.clone()),
            RunnerArgs::Raw(s) => {
                shlex::split(s).ok_or_else(|| TestlaneError::InvalidRunnerArgs(s.clone()))
            }
        }
    }
}

/// One test-run request and its scheduling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Identifier for the test-run family; stored report names derive
    /// from it.
    pub name: String,

    /// URI identifying what to test. Only the `file` scheme is supported;
    /// anything else is rejected before any subprocess is spawned.
    pub location: String,

    /// Arguments appended to the runner command line, unmodified.
    #[serde(default)]
    pub runner_args: RunnerArgs,

    /// Explicit path for the raw structured report.
    ///
    /// When absent, a transient path is generated and removed once the
    /// report has been handed to storage.
    #[serde(default)]
    pub report_path: Option<PathBuf>,

    /// Duration bound forwarded opaquely to the backend at registration.
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Lane the job is registered and executed under.
    pub queue_name: String,

    /// Cron-style recurrence expression. Presence marks a deferred
    /// registration as recurring; deferred scheduling without it is an
    /// error.
    #[serde(default)]
    pub cron_string: Option<String>,

    /// Instant or deferred execution.
    #[serde(default)]
    pub mode: RunMode,
}

/// Resolve the filesystem path of a `file` location.
///
/// `file:///tests/smoke` resolves to `/tests/smoke`. Any other scheme (or
/// a string with no scheme at all) is an [`TestlaneError::UnsupportedScheme`]
/// error, raised before the caller performs any side effect.
pub fn file_location_path(location: &str) -> Result<PathBuf> {
    let (scheme, rest) = location
        .split_once("://")
        .ok_or_else(|| TestlaneError::UnsupportedScheme(location.to_string()))?;

    if !scheme.eq_ignore_ascii_case("file") {
        return Err(TestlaneError::UnsupportedScheme(scheme.to_string()));
    }

    Ok(PathBuf::from(rest))
}
