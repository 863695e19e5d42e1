/*!
 * Cue parsing: converts one raw timed-text cue into a word-timed lyric line.
 *
 * Karaoke cues embed per-word timing as inline markers:
 *
 * ```text
 * <00:00:10.000>Hello <00:00:11.500>world
 * ```
 *
 * Every marker starts a word that becomes "sung" at the marker's instant.
 * Cues without any markers are split on whitespace and every word inherits
 * the cue's start time. WebVTT styling spans such as `<c>` or `<v Name>` are
 * ignored.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::CueError;

// @const: Inline word marker followed by its token, up to the next tag
static WORD_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(\d[\d:.]*)>([^<]*)").unwrap()
});

// @const: WebVTT span tags (class, italic, bold, underline, voice, language, ruby)
static SPAN_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?(?:c|i|b|u|v|lang|ruby|rt)(?:[.\s][^>]*)?>").unwrap()
});

// @const: HH:MM:SS.mmm or MM:SS.mmm
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2}(?:\.\d{1,3})?)$").unwrap()
});

/// Raw cue as delivered by a timed cue source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Cue text, possibly carrying inline word markers
    pub text: String,
}

impl RawCue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A single word and the instant it becomes sung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Seconds from the start of the media
    pub time: f64,
    /// Non-empty, trimmed word text
    pub text: String,
}

/// A parsed cue: one lyric line with its ordered words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Position in the owning line set
    pub index: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Words ordered by non-decreasing time, never empty
    pub words: Vec<Word>,
}

impl Line {
    /// Full line text with words joined by single spaces
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the line carries per-word timing or only the degraded fallback
    pub fn has_word_timing(&self) -> bool {
        self.words.iter().any(|w| w.time != self.start)
    }
}

/// Parse a timestamp of the form `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64, CueError> {
    let caps = TIMESTAMP_REGEX
        .captures(timestamp.trim())
        .ok_or_else(|| CueError::MalformedTimestamp(timestamp.to_string()))?;

    let malformed = || CueError::MalformedTimestamp(timestamp.to_string());

    let hours: f64 = match caps.get(1) {
        Some(m) => m.as_str().parse().map_err(|_| malformed())?,
        None => 0.0,
    };
    let minutes: f64 = caps[2].parse().map_err(|_| malformed())?;
    let seconds: f64 = caps[3].parse().map_err(|_| malformed())?;

    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(malformed());
    }

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Format seconds as `HH:MM:SS.mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Extract timed words from the cue text.
///
/// Returns `None` when the text carries no word markers at all, so the caller
/// can fall back to untimed splitting. Malformed markers are skipped one by
/// one without aborting the rest of the cue.
fn extract_timed_words(cue_index: usize, start: f64, raw_text: &str) -> Option<Vec<Word>> {
    let mut words = Vec::new();

    // Untimed text ahead of the first marker is sung with the line
    let first_marker = WORD_MARKER_REGEX.find(raw_text)?;
    for token in raw_text[..first_marker.start()].split_whitespace() {
        words.push(Word {
            time: start,
            text: token.to_string(),
        });
    }

    for caps in WORD_MARKER_REGEX.captures_iter(raw_text) {
        let marker = &caps[1];
        let token = caps[2].trim();

        let time = match parse_timestamp(marker) {
            Ok(time) => time,
            Err(e) => {
                warn!("Skipping word in cue {}: {}", cue_index, e);
                continue;
            }
        };

        if token.is_empty() {
            continue;
        }

        words.push(Word {
            time,
            text: token.to_string(),
        });
    }

    Some(words)
}

/// Parse one raw cue into a line.
///
/// Returns `None` for degenerate cues (inverted range or no words); those are
/// dropped rather than reported.
pub fn parse_cue(cue_index: usize, start: f64, end: f64, raw_text: &str) -> Option<Line> {
    if !start.is_finite() || !end.is_finite() || end <= start {
        debug!(
            "Dropping cue {}: {}",
            cue_index,
            CueError::InvalidRange { start, end }
        );
        return None;
    }

    // Styling spans carry no timing and would otherwise cut words short
    let text = SPAN_TAG_REGEX.replace_all(raw_text, "");

    let mut words = match extract_timed_words(cue_index, start, &text) {
        Some(words) => words,
        None => text
            .split_whitespace()
            .map(|token| Word {
                time: start,
                text: token.to_string(),
            })
            .collect(),
    };

    if words.is_empty() {
        debug!("Dropping cue {}: {}", cue_index, CueError::EmptyText);
        return None;
    }

    // Stable, so equal timestamps keep their textual order
    words.sort_by(|a, b| a.time.total_cmp(&b.time));

    Some(Line {
        index: cue_index,
        start,
        end,
        words,
    })
}

/// Parse a whole track's cues into a dense, start-ordered list of lines
pub fn parse_cues(cues: &[RawCue]) -> Vec<Line> {
    let mut lines: Vec<Line> = cues
        .iter()
        .enumerate()
        .filter_map(|(i, cue)| parse_cue(i, cue.start, cue.end, &cue.text))
        .collect();

    lines.sort_by(|a, b| a.start.total_cmp(&b.start));
    for (index, line) in lines.iter_mut().enumerate() {
        line.index = index;
    }

    debug!("Parsed {} of {} cues into lines", lines.len(), cues.len());
    lines
}
