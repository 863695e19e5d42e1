/*!
 * # lyricsync - word-highlighted lyrics synchronized to a playback clock
 *
 * Takes karaoke-style timed-text cues (`<HH:MM:SS.mmm>word ...`) and keeps a
 * scrolling lyrics display in step with playback through normal advance and
 * arbitrary seeks, even when cues arrive late.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `cue_parser`: one raw cue into a line of timed words
 * - `sync`: the per-session synchronization engine
 * - `presentation`: collaborator traits, idempotent rendering, bounded cue polling
 * - `vtt_processor`: WebVTT caption files as a cue source
 * - `simulation`: a virtual playback clock and console renderer
 * - `app_config`: configuration management
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod cue_parser;
pub mod errors;
pub mod presentation;
pub mod simulation;
pub mod sync;
pub mod vtt_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cue_parser::{parse_cue, Line, RawCue, Word};
pub use errors::{AppError, ConfigError, CueError, VttError};
pub use presentation::{LyricsStatus, PresentationAdapter, Renderer};
pub use sync::{StateChange, SyncEngine};
