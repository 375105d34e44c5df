// src/logging.rs

//! Logging setup for `testlane` using `tracing` + `tracing-subscriber`.
//!
//! The `--log-level` flag wins; otherwise the `TESTLANE_LOG` env var is
//! read as an `EnvFilter` directive, defaulting to `info`. Logs go to
//! stderr so stdout stays free for the test-runner subprocess and for
//! listing output.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

const ENV_VAR: &str = "TESTLANE_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(directive(level)),
        None => EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
