// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// program = "pytest"
///
/// [store]
/// dir = "test_results"
///
/// [queues]
/// default = "default"
/// allowed = ["default", "priority"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Test-runner invocation config from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,

    /// Report storage config from `[store]`.
    #[serde(default)]
    pub store: StoreSection,

    /// Queue routing config from `[queues]`.
    #[serde(default)]
    pub queues: QueuesSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// The test-runner program invoked for every run.
    #[serde(default = "default_runner_program")]
    pub program: String,
}

fn default_runner_program() -> String {
    "pytest".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            program: default_runner_program(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Directory stored reports are written into.
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

fn default_store_dir() -> String {
    "test_results".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

/// `[queues]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueuesSection {
    /// Queue a request lands on when it names none.
    #[serde(default = "default_queue_name")]
    pub default: String,

    /// Lanes shown by queue listings.
    ///
    /// Empty means no restriction: listings show every lane.
    #[serde(default)]
    pub allowed: Vec<String>,
}

fn default_queue_name() -> String {
    "default".to_string()
}

impl Default for QueuesSection {
    fn default() -> Self {
        Self {
            default: default_queue_name(),
            allowed: Vec::new(),
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `ConfigFile::try_from(raw)`, which runs the
/// checks in `validate.rs` first.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub store: StoreSection,
    pub queues: QueuesSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerSection,
        store: StoreSection,
        queues: QueuesSection,
    ) -> Self {
        Self {
            runner,
            store,
            queues,
        }
    }

    /// The lane restriction for queue listings, `None` when unrestricted.
    pub fn allowed_queues(&self) -> Option<&[String]> {
        if self.queues.allowed.is_empty() {
            None
        } else {
            Some(&self.queues.allowed)
        }
    }
}
