/*!
 * Presentation layer between the playback host and the sync engine.
 *
 * This module provides:
 * - `sources`: collaborator traits for the media clock and the cue supplier
 * - `render`: the renderer contract and idempotent view bookkeeping
 * - `cue_poller`: bounded, cancellable waiting for cue arrival
 * - `adapter`: the event-driven glue owning one session at a time
 */

pub mod adapter;
pub mod cue_poller;
pub mod render;
pub mod sources;

// Re-export main types
pub use adapter::PresentationAdapter;
pub use cue_poller::{wait_for_cues, CuePoller, CueWait, PollOutcome, PollState};
pub use render::{LineView, LineVisual, LyricsStatus, Renderer, WordVisual};
pub use sources::{PlaybackSource, TextTrack, TimedCueSource};
