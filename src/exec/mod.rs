// src/exec/mod.rs

//! Test execution layer.
//!
//! This module runs the test-runner subprocess for a single [`RunRequest`]
//! and records the outcome:
//!
//! - [`runner`] owns the [`TestRunner`], which resolves the raw-report
//!   path, spawns the runner, enriches the resulting report with run
//!   context, and hands it to the report store.
//!
//! Execution is synchronous by design: concurrent runs are a concern of
//! the external worker backend, never of this layer.
//!
//! [`RunRequest`]: crate::request::RunRequest

pub mod runner;

pub use runner::{StoredReport, TestRunner};
