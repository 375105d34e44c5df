// src/report/store.rs

//! Durable key → payload storage for finished reports.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;

/// Durable store for report payloads.
///
/// A put is fire-and-forget on success; any backend error must propagate
/// to the caller, never be swallowed.
pub trait ReportStore: Send + Sync {
    fn put(&self, name: &str, payload: &Value) -> Result<()>;
}

/// Filesystem-backed store writing one JSON file per report under a
/// results directory.
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportStore for FsReportStore {
    fn put(&self, name: &str, payload: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(name);
        let contents = serde_json::to_string_pretty(payload)?;
        fs::write(&path, contents)?;

        debug!(report = %name, path = %path.display(), "stored report");
        Ok(())
    }
}
