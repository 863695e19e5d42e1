use std::fs;
use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cue_parser::{parse_timestamp, RawCue};
use crate::errors::VttError;
use crate::presentation::{TextTrack, TimedCueSource};

// @module: WebVTT caption document reading

// @const: Cue timing line, settings after the end time are ignored
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\s+-->\s+(\S+)").unwrap()
});

/// Parse a WebVTT document into raw cues.
///
/// Malformed cue blocks are skipped with a warning; only a missing `WEBVTT`
/// signature fails the whole document.
pub fn parse_vtt_str(content: &str) -> Result<Vec<RawCue>, VttError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let mut blocks = blocks.into_iter();
    match blocks.next() {
        Some(header) if header[0].trim_start().starts_with("WEBVTT") => {}
        _ => return Err(VttError::MissingHeader),
    }

    let mut cues = Vec::new();
    for (block_num, block) in blocks.enumerate() {
        let first = block[0].trim();
        if first.starts_with("NOTE") || first.starts_with("STYLE") || first.starts_with("REGION") {
            continue;
        }

        // An optional identifier line may precede the timing line
        let timing_at = match block.iter().position(|l| l.contains("-->")) {
            Some(pos) if pos <= 1 => pos,
            _ => {
                warn!("Skipping VTT block {} without a timing line", block_num + 1);
                continue;
            }
        };

        let Some(caps) = TIMING_REGEX.captures(block[timing_at].trim()) else {
            warn!("Skipping VTT block {}: bad timing line '{}'", block_num + 1, block[timing_at]);
            continue;
        };

        let (start, end) = match (parse_timestamp(&caps[1]), parse_timestamp(&caps[2])) {
            (Ok(start), Ok(end)) => (start, end),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Skipping VTT block {}: {}", block_num + 1, e);
                continue;
            }
        };

        if end <= start {
            warn!("Skipping VTT block {}: end {} <= start {}", block_num + 1, end, start);
            continue;
        }

        let text = block[timing_at + 1..]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            debug!("VTT block {} has no text", block_num + 1);
            continue;
        }

        cues.push(RawCue::new(start, end, text));
    }

    debug!("Read {} cues from VTT document", cues.len());
    Ok(cues)
}

/// Read and parse a WebVTT file
pub fn parse_vtt_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawCue>, VttError> {
    let content = fs::read_to_string(path)?;
    parse_vtt_str(&content)
}

/// A caption track backed by a WebVTT file, loaded eagerly
#[derive(Debug, Clone)]
pub struct VttTrack {
    pub name: String,
    pub cues: Vec<RawCue>,
}

impl VttTrack {
    /// Load the file; the track is named after the file stem
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VttError> {
        let path = path.as_ref();
        let cues = parse_vtt_file(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("captions"));
        Ok(Self { name, cues })
    }
}

impl TimedCueSource for VttTrack {
    fn tracks(&self) -> Vec<TextTrack> {
        vec![TextTrack::new(self.name.clone(), self.cues.clone())]
    }
}
