/*!
 * Tests for app configuration
 */

use lyricsync::app_config::{Config, LogLevel, PollConfig, SyncConfig};
use lyricsync::errors::ConfigError;
use log::LevelFilter;
use crate::common;

/// Defaults match the documented tolerances
#[test]
fn test_default_config_shouldUseDocumentedTolerances() {
    let config = Config::default();

    assert_eq!(config.sync.lookahead_secs, 2.0);
    assert_eq!(config.sync.end_slack_secs, 0.04);
    assert_eq!(config.sync.word_end_slack_secs, 0.1);
    assert_eq!(config.sync.completion_grace_secs, 0.3);
    assert_eq!(config.polling.interval_ms, 250);
    assert_eq!(config.polling.max_wait_ms, 10_000);
    assert_eq!(config.polling.max_attempts(), 41);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Negative or non-finite tolerances are rejected
#[test]
fn test_validate_withBadTolerance_shouldFail() {
    let mut config = Config::default();
    config.sync.lookahead_secs = -1.0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = Config {
        sync: SyncConfig {
            completion_grace_secs: f64::NAN,
            ..SyncConfig::default()
        },
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

/// The polling window must hold at least one interval
#[test]
fn test_validate_withBadPolling_shouldFail() {
    let zero_interval = Config {
        polling: PollConfig {
            interval_ms: 0,
            max_wait_ms: 1000,
        },
        ..Config::default()
    };
    assert!(zero_interval.validate().is_err());

    let short_window = Config {
        polling: PollConfig {
            interval_ms: 500,
            max_wait_ms: 100,
        },
        ..Config::default()
    };
    let error = short_window.validate().unwrap_err();
    assert!(error.to_string().contains("max_wait_ms"));
}

/// Saving then loading yields the same config
#[test]
fn test_config_file_withSaveAndLoad_shouldPreserveValues() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");
    let config = Config {
        sync: SyncConfig {
            lookahead_secs: 3.0,
            ..SyncConfig::default()
        },
        log_level: LogLevel::Debug,
        ..Config::default()
    };

    config.to_file(&path)?;
    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded, config);
    assert_eq!(loaded.log_level.to_level_filter(), LevelFilter::Debug);
    Ok(())
}

/// Invalid values in a file are caught at load time
#[test]
fn test_from_file_withInvalidValues_shouldFail() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"polling": {"interval_ms": 0}, "log_level": "trace"}"#,
    )?;

    assert!(matches!(Config::from_file(&path), Err(ConfigError::Invalid(_))));
    Ok(())
}

/// Broken JSON surfaces as a parse error
#[test]
fn test_from_file_withBrokenJson_shouldReturnJsonError() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;

    assert!(matches!(Config::from_file(&path), Err(ConfigError::Json(_))));
    assert!(matches!(
        Config::from_file(dir.path().join("absent.json")),
        Err(ConfigError::Io(_))
    ));
    Ok(())
}
