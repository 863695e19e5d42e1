/*!
 * Error types for the lyricsync library.
 *
 * None of these ever escape the synchronization engine's entry points. They
 * are produced by the low-level helpers (timestamp parsing, cue validation,
 * file loading) and absorbed by the callers that degrade gracefully.
 */

use thiserror::Error;

/// Errors raised while interpreting a single cue
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CueError {
    /// A timestamp token could not be parsed
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    /// The cue's time range is empty or inverted
    #[error("Invalid cue range: end {end} <= start {start}")]
    InvalidRange {
        /// Start time in seconds
        start: f64,
        /// End time in seconds
        end: f64,
    },

    /// The cue produced no words
    #[error("Cue text contains no words")]
    EmptyText,
}

/// Errors raised while reading a WebVTT document
#[derive(Error, Debug)]
pub enum VttError {
    /// The document does not start with the WEBVTT signature
    #[error("Missing WEBVTT header")]
    MissingHeader,

    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file could not be read or written
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from cue interpretation
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// Error from WebVTT loading
    #[error("VTT error: {0}")]
    Vtt(#[from] VttError),

    /// Error from configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
