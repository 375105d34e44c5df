use std::sync::{Arc, Mutex};

use serde_json::Value;
use testlane::errors::Result;
use testlane::report::ReportStore;

/// A report store that keeps every `(name, payload)` pair in memory.
#[derive(Clone, Default)]
pub struct MemoryReportStore {
    reports: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        let reports = self.reports.lock().unwrap();
        reports.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let reports = self.reports.lock().unwrap();
        reports
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, payload)| payload.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().unwrap().is_empty()
    }
}

impl ReportStore for MemoryReportStore {
    fn put(&self, name: &str, payload: &Value) -> Result<()> {
        self.reports
            .lock()
            .unwrap()
            .push((name.to_string(), payload.clone()));
        Ok(())
    }
}
