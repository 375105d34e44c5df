// src/lib.rs

pub mod backend;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod request;
pub mod sched;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::backend::Unconfigured;
use crate::cli::{CliArgs, Command, ListWhat, RunArgs};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::exec::TestRunner;
use crate::report::FsReportStore;
use crate::request::{RunMode, RunRequest, RunnerArgs};
use crate::sched::{Coordinator, ScheduleOutcome};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - report store + test runner
/// - the coordinator over the scheduler backend
///
/// No queue backend is wired up out of the box, so every subcommand that
/// needs one reports the backend as unavailable; `run` works standalone.
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let store = Arc::new(FsReportStore::new(&cfg.store.dir));
    let runner = TestRunner::new(&cfg.runner.program, store);

    // Library embedders supply their own backend; the CLI has none.
    let backend = Arc::new(Unconfigured);
    let coordinator = Coordinator::new(backend.clone(), backend.clone(), backend, runner);

    dispatch(&coordinator, &cfg, args.command)
}

fn dispatch(coordinator: &Coordinator, cfg: &ConfigFile, command: Command) -> Result<()> {
    match command {
        Command::Run(run_args) => {
            let request = build_request(cfg, run_args, None, RunMode::Instant);
            match coordinator.schedule(&request)? {
                ScheduleOutcome::Ran(report) => println!("stored report {}", report.name),
                ScheduleOutcome::Registered(job) => {
                    debug!(job = %job.id, "instant request came back registered");
                    println!("registered job {}", job.id);
                }
            }
        }
        Command::Schedule(schedule_args) => {
            let request = build_request(
                cfg,
                schedule_args.run,
                Some(schedule_args.cron),
                RunMode::Deferred,
            );
            match coordinator.schedule(&request)? {
                ScheduleOutcome::Registered(job) => println!("registered job {}", job.id),
                ScheduleOutcome::Ran(report) => {
                    debug!(report = %report.name, "deferred request ran instantly");
                    println!("stored report {}", report.name);
                }
            }
        }
        Command::Launch { job_id } => {
            let job = coordinator.run_now(&job_id)?;
            println!("launched job {} on queue {}", job.id, job.lane);
        }
        Command::Show { job_id } => {
            let request = coordinator.request_for_job(&job_id)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Cancel { job_id } => {
            match coordinator.find_scheduled(&job_id)? {
                Some(job) => {
                    coordinator.cancel(&job)?;
                    println!("cancelled job {job_id}");
                }
                None => println!("no scheduled job {job_id}"),
            }
        }
        Command::Requeue { job_id } => {
            let job = coordinator.requeue(&job_id)?;
            println!("requeued job {} on queue {}", job.id, job.lane);
        }
        Command::Cleanup { job_id } => {
            println!("{}", coordinator.discard_failed(&job_id)?);
        }
        Command::List { what } => list(coordinator, cfg, what)?,
    }
    Ok(())
}

fn list(coordinator: &Coordinator, cfg: &ConfigFile, what: ListWhat) -> Result<()> {
    match what {
        ListWhat::Scheduled => {
            for run in coordinator.recurring_runs()? {
                println!(
                    "{}  [{}]  {}  ({})",
                    run.job_id, run.schedule, run.request.name, run.request.queue_name
                );
            }
        }
        ListWhat::Queued => {
            for job in coordinator.queued_runs(cfg.allowed_queues())? {
                println!("{}  ({})", job.id, job.lane);
            }
        }
        ListWhat::Failed => {
            for job in coordinator.failed_runs()? {
                println!("{}  ({})", job.id, job.lane);
            }
        }
    }
    Ok(())
}

fn build_request(
    cfg: &ConfigFile,
    args: RunArgs,
    cron_string: Option<String>,
    mode: RunMode,
) -> RunRequest {
    RunRequest {
        name: args.name,
        location: args.location,
        runner_args: args
            .args
            .map(RunnerArgs::Raw)
            .unwrap_or_default(),
        report_path: args.report_path,
        timeout: args.timeout.map(Duration::from_secs),
        queue_name: args.queue.unwrap_or_else(|| cfg.queues.default.clone()),
        cron_string,
        mode,
    }
}
