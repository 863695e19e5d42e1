/*!
 * Lyric synchronization against a playback clock.
 *
 * This module provides:
 * - `LineSet`, `RevealState`, `ActiveState`: the per-session state triple
 * - `SyncEngine`: the tick/seek state machine emitting `StateChange`s
 */

pub mod engine;
pub mod state;

// Re-export main types
pub use engine::{StateChange, SyncEngine};
pub use state::{ActiveState, LineSet, RevealState};
