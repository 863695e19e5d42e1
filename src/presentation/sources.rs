/*!
 * Interfaces of the external collaborators the adapter is wired to.
 *
 * Streaming, decoding and track selection live behind these traits; the
 * adapter reads the clock and loaded cues and requests seeks.
 */

use crate::cue_parser::RawCue;

/// The media clock and transport controls
pub trait PlaybackSource {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Media duration in seconds
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    /// Move the clock to `time`, already clamped to `[0, duration]`
    fn seek(&mut self, time: f64);

    /// Clamp a requested position into the playable range.
    ///
    /// Non-finite requests fall back to the start of the media.
    fn clamp_time(&self, time: f64) -> f64 {
        let duration = self.duration();
        let upper = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        if time.is_nan() {
            return 0.0;
        }
        time.clamp(0.0, upper)
    }
}

/// A named text track and whatever cues it has loaded so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTrack {
    pub name: String,
    /// Empty until the track has finished loading
    pub cues: Vec<RawCue>,
}

impl TextTrack {
    pub fn new(name: impl Into<String>, cues: Vec<RawCue>) -> Self {
        Self {
            name: name.into(),
            cues,
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.cues.is_empty()
    }
}

/// Supplier of timed-text tracks, possibly loading them asynchronously
pub trait TimedCueSource {
    /// Snapshot of the tracks currently exposed
    fn tracks(&self) -> Vec<TextTrack>;

    /// Cues of the first track that has finished loading
    fn loaded_cues(&self) -> Option<Vec<RawCue>> {
        self.tracks()
            .into_iter()
            .find(TextTrack::is_loaded)
            .map(|track| track.cues)
    }
}
