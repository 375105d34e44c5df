// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TestlaneError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestlaneError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.store, raw.queues))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_store(cfg)?;
    validate_queues(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.program.trim().is_empty() {
        return Err(TestlaneError::ConfigError(
            "[runner].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_store(cfg: &RawConfigFile) -> Result<()> {
    if cfg.store.dir.trim().is_empty() {
        return Err(TestlaneError::ConfigError(
            "[store].dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_queues(cfg: &RawConfigFile) -> Result<()> {
    if cfg.queues.default.trim().is_empty() {
        return Err(TestlaneError::ConfigError(
            "[queues].default must not be empty".to_string(),
        ));
    }

    // An allowed list that excludes the default queue would hide every job
    // this instance enqueues from its own listings.
    if !cfg.queues.allowed.is_empty() && !cfg.queues.allowed.contains(&cfg.queues.default) {
        return Err(TestlaneError::ConfigError(format!(
            "[queues].allowed must include the default queue '{}'",
            cfg.queues.default
        )));
    }

    Ok(())
}
