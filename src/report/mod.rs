// src/report/mod.rs

//! Report naming and durable report storage.
//!
//! A test run produces a raw JSON report file; the executor wraps its
//! `report` object with run context and hands it to a [`ReportStore`]
//! under a unique name derived from the request's `name` and the report's
//! own completion timestamp.

pub mod store;

pub use store::{FsReportStore, ReportStore};

use chrono::NaiveDateTime;

use crate::errors::{Result, TestlaneError};

/// Key of the report envelope inside the raw runner output.
pub const REPORT_ENVELOPE_KEY: &str = "report";

/// Key of the completion timestamp inside the report payload.
pub const CREATED_AT_KEY: &str = "created_at";

/// Key under which the resolved location is attached to a stored report.
pub const URL_KEY: &str = "url";

/// Key under which the exact command line is attached to a stored report.
pub const CMD_LINE_KEY: &str = "cmd_line";

/// Suffix appended to every stored report name. Kept for compatibility
/// with the legacy result-cache keys external consumers index by.
pub const REPORT_SUFFIX: &str = ".pkl";

/// Timestamp layout produced by the test runner, fractional seconds aside.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive the unique stored name for a report.
///
/// The completion timestamp is truncated to second granularity, so
/// `("nightly", "2023-04-05 06:07:08.123")` yields
/// `nightly_20230405_060708.pkl`.
pub fn report_name(name: &str, created_at: &str) -> Result<String> {
    let seconds = created_at.split('.').next().unwrap_or(created_at);
    let stamp = NaiveDateTime::parse_from_str(seconds, CREATED_AT_FORMAT).map_err(|e| {
        TestlaneError::MalformedReport(format!(
            "unparseable {CREATED_AT_KEY} '{created_at}': {e}"
        ))
    })?;

    Ok(format!(
        "{name}_{}{REPORT_SUFFIX}",
        stamp.format("%Y%m%d_%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_derives_from_second_granularity_timestamp() {
        let name = report_name("nightly", "2023-04-05 06:07:08.123").unwrap();
        assert_eq!(name, "nightly_20230405_060708.pkl");
    }

    #[test]
    fn timestamp_without_fraction_is_accepted() {
        let name = report_name("smoke", "2024-12-31 23:59:59").unwrap();
        assert_eq!(name, "smoke_20241231_235959.pkl");
    }

    #[test]
    fn garbage_timestamp_is_a_malformed_report() {
        assert!(matches!(
            report_name("smoke", "yesterday-ish"),
            Err(TestlaneError::MalformedReport(_))
        ));
    }
}
