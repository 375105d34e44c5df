// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `testlane`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testlane",
    version,
    about = "Run test suites now or register them with an external job queue.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Testlane.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Testlane.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTLANE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a test suite right now and store its report.
    Run(RunArgs),

    /// Register a recurring run with the scheduler backend.
    Schedule(ScheduleArgs),

    /// Launch a previously registered job immediately.
    Launch {
        /// Backend id of the registered job.
        job_id: String,
    },

    /// Show the request a registered job was created from.
    Show {
        job_id: String,
    },

    /// Remove a job from the schedule.
    Cancel {
        job_id: String,
    },

    /// Move a failed job back onto its queue.
    Requeue {
        job_id: String,
    },

    /// Remove a failed job permanently.
    Cleanup {
        job_id: String,
    },

    /// List jobs known to the backend.
    List {
        #[command(subcommand)]
        what: ListWhat,
    },
}

/// Arguments shared by `run` and `schedule`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Name of the run; stored report names derive from it.
    pub name: String,

    /// Location of the test suite, e.g. `file:///path/to/tests`.
    pub location: String,

    /// Extra arguments passed to the test runner, as one shell-style string.
    #[arg(long, value_name = "ARGS")]
    pub args: Option<String>,

    /// Explicit path for the raw report file (default: a transient file).
    #[arg(long, value_name = "PATH")]
    pub report_path: Option<PathBuf>,

    /// Per-run timeout in seconds, forwarded to the backend.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Queue to run on (default: `[queues].default` from the config).
    #[arg(long, value_name = "QUEUE")]
    pub queue: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Cron expression for the recurring schedule, e.g. `"0 2 * * *"`.
    #[arg(long, value_name = "CRON")]
    pub cron: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ListWhat {
    /// Recurring runs registered with the scheduler.
    Scheduled,
    /// Jobs currently waiting on a queue.
    Queued,
    /// Failed jobs belonging to this scheduling domain.
    Failed,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
