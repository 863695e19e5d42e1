use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

/// Application configuration module
/// This module handles loading, validating and saving the tolerances that
/// drive lyric synchronization and the cue polling policy.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Synchronization tolerances
    #[serde(default)]
    pub sync: SyncConfig,

    /// Cue arrival polling policy
    #[serde(default)]
    pub polling: PollConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Tolerances used by the synchronization engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SyncConfig {
    /// How far ahead of its start a line is revealed, in seconds
    #[serde(default = "default_lookahead_secs")]
    pub lookahead_secs: f64,

    /// How long past its end a line stays active, in seconds
    ///
    /// Absorbs tick granularity so a line does not close a fraction of a
    /// second early.
    #[serde(default = "default_end_slack_secs")]
    pub end_slack_secs: f64,

    /// How early the final word of a line is marked sung, in seconds
    #[serde(default = "default_word_end_slack_secs")]
    pub word_end_slack_secs: f64,

    /// Media time between "will complete" and "completed" for a line that
    /// loses active status during normal playback, in seconds
    #[serde(default = "default_completion_grace_secs")]
    pub completion_grace_secs: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookahead_secs: default_lookahead_secs(),
            end_slack_secs: default_end_slack_secs(),
            word_end_slack_secs: default_word_end_slack_secs(),
            completion_grace_secs: default_completion_grace_secs(),
        }
    }
}

/// Bounded polling policy for cue arrival
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay between two checks of the cue source, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Total time to wait for cues before settling on "no lyrics", in milliseconds
    #[serde(default = "default_poll_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl PollConfig {
    /// Number of checks that fit in the wait window, the first one included
    pub fn max_attempts(&self) -> u32 {
        if self.interval_ms == 0 {
            return 1;
        }
        (self.max_wait_ms / self.interval_ms) as u32 + 1
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_wait_ms: default_poll_max_wait_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_lookahead_secs() -> f64 {
    2.0
}

fn default_end_slack_secs() -> f64 {
    0.04
}

fn default_word_end_slack_secs() -> f64 {
    0.1
}

fn default_completion_grace_secs() -> f64 {
    0.3
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_poll_max_wait_ms() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerances = [
            ("lookahead_secs", self.sync.lookahead_secs),
            ("end_slack_secs", self.sync.end_slack_secs),
            ("word_end_slack_secs", self.sync.word_end_slack_secs),
            ("completion_grace_secs", self.sync.completion_grace_secs),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "polling.interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.polling.max_wait_ms < self.polling.interval_ms {
            return Err(ConfigError::Invalid(format!(
                "polling.max_wait_ms ({}) must cover at least one interval ({})",
                self.polling.max_wait_ms, self.polling.interval_ms
            )));
        }

        Ok(())
    }
}
