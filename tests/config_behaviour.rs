// tests/config_behaviour.rs

use std::error::Error;
use std::fs;

use testlane::config::{load_and_validate, ConfigFile, RawConfigFile};
use testlane::errors::TestlaneError;
use testlane_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_config_gets_the_defaults() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Testlane.toml");
    fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.runner.program, "pytest");
    assert_eq!(cfg.store.dir, "test_results");
    assert_eq!(cfg.queues.default, "default");
    assert!(cfg.allowed_queues().is_none());
    Ok(())
}

#[test]
fn sections_override_the_defaults() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Testlane.toml");
    fs::write(
        &path,
        r#"
[runner]
program = "pytest-3.12"

[store]
dir = "/var/lib/testlane/results"

[queues]
default = "ci"
allowed = ["ci", "nightly"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.runner.program, "pytest-3.12");
    assert_eq!(cfg.store.dir, "/var/lib/testlane/results");
    assert_eq!(cfg.queues.default, "ci");
    assert_eq!(
        cfg.allowed_queues(),
        Some(["ci".to_string(), "nightly".to_string()].as_slice())
    );
    Ok(())
}

#[test]
fn missing_config_file_is_an_io_error() {
    init_tracing();
    let err = load_and_validate("/definitely/not/here/Testlane.toml").unwrap_err();
    assert!(matches!(err, TestlaneError::IoError(_)));
}

#[test]
fn allowed_list_must_include_the_default_queue() {
    init_tracing();
    let raw: RawConfigFile = toml::from_str(
        r#"
[queues]
default = "ci"
allowed = ["nightly"]
"#,
    )
    .unwrap();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, TestlaneError::ConfigError(_)));
}

#[test]
fn empty_runner_program_is_rejected() {
    init_tracing();
    let raw: RawConfigFile = toml::from_str("[runner]\nprogram = \"  \"\n").unwrap();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, TestlaneError::ConfigError(_)));
}
