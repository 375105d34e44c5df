// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestlaneError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported location scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Deferred scheduling requires a cron string")]
    MissingCronString,

    #[error("No scheduler backend configured")]
    BackendUnavailable,

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Malformed test report: {0}")]
    MalformedReport(String),

    #[error("Invalid runner arguments: {0}")]
    InvalidRunnerArgs(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TestlaneError>;
