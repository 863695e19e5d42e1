/*!
 * In-process stand-ins for the playback host.
 *
 * Used by the `play` command to drive the adapter without a real media
 * stack, and by tests as deterministic collaborators.
 */

use std::cell::Cell;

use log::info;

use crate::cue_parser::{format_timestamp, Line, RawCue};
use crate::presentation::{LineVisual, LyricsStatus, PlaybackSource, Renderer, TextTrack, TimedCueSource, WordVisual};

/// Playback clock advanced explicitly by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPlayer {
    position: f64,
    duration: f64,
    paused: bool,
}

impl SimulatedPlayer {
    /// A paused player at position zero
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
            paused: true,
        }
    }

    /// Move the clock forward by `elapsed` seconds if playing.
    ///
    /// Returns false once the end of the media is reached.
    pub fn advance(&mut self, elapsed: f64) -> bool {
        if !self.paused {
            self.position = (self.position + elapsed.max(0.0)).min(self.duration);
        }
        self.position < self.duration
    }

    pub fn has_ended(&self) -> bool {
        self.position >= self.duration
    }
}

impl PlaybackSource for SimulatedPlayer {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn seek(&mut self, time: f64) {
        self.position = self.clamp_time(time);
    }
}

/// Cue source whose tracks only report cues after a number of checks
#[derive(Debug)]
pub struct DelayedCueSource {
    tracks: Vec<TextTrack>,
    checks_until_loaded: u32,
    checks: Cell<u32>,
}

impl DelayedCueSource {
    /// Tracks are available on the first check
    pub fn ready(tracks: Vec<TextTrack>) -> Self {
        Self::delayed(tracks, 0)
    }

    /// Tracks stay empty for `checks_until_loaded` checks
    pub fn delayed(tracks: Vec<TextTrack>, checks_until_loaded: u32) -> Self {
        Self {
            tracks,
            checks_until_loaded,
            checks: Cell::new(0),
        }
    }

    /// A single track named `name` with the given cues
    pub fn single(name: &str, cues: Vec<RawCue>) -> Self {
        Self::ready(vec![TextTrack::new(name, cues)])
    }

    /// Number of times the tracks have been inspected
    pub fn checks(&self) -> u32 {
        self.checks.get()
    }
}

impl TimedCueSource for DelayedCueSource {
    fn tracks(&self) -> Vec<TextTrack> {
        let seen = self.checks.get();
        self.checks.set(seen + 1);
        if seen < self.checks_until_loaded {
            return self
                .tracks
                .iter()
                .map(|track| TextTrack::new(track.name.clone(), Vec::new()))
                .collect();
        }
        self.tracks.clone()
    }
}

/// Handle for a line printed to the console
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub index: usize,
    pub start: f64,
    pub words: Vec<String>,
}

/// Renderer writing every operation as one log line
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    operations: usize,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rendering operations performed so far
    pub fn operations(&self) -> usize {
        self.operations
    }
}

impl Renderer for ConsoleRenderer {
    type Handle = ConsoleLine;

    fn create_line(&mut self, line: &Line) -> ConsoleLine {
        ConsoleLine {
            index: line.index,
            start: line.start,
            words: line.words.iter().map(|w| w.text.clone()).collect(),
        }
    }

    fn set_line_visual(&mut self, handle: &mut ConsoleLine, visual: LineVisual) {
        self.operations += 1;
        info!(
            "[{}] line {:>3} {:<10} {}",
            format_timestamp(handle.start),
            handle.index,
            format!("{:?}", visual),
            handle.words.join(" ")
        );
    }

    fn set_word_visual(&mut self, handle: &mut ConsoleLine, word: usize, visual: WordVisual) {
        self.operations += 1;
        if visual == WordVisual::Sung {
            if let Some(text) = handle.words.get(word) {
                info!("        line {:>3} word {:>2} {}", handle.index, word, text);
            }
        }
    }

    fn clear(&mut self) {
        self.operations += 1;
        info!("Clearing lyrics");
    }

    fn show_status(&mut self, status: LyricsStatus) {
        match status {
            LyricsStatus::Waiting => info!("Waiting for lyrics..."),
            LyricsStatus::Ready { lines } => info!("Lyrics ready: {} lines", lines),
            LyricsStatus::NoLyrics => info!("No lyrics available for this track"),
        }
    }
}
