/*!
 * Per-session synchronization state.
 *
 * A fresh set of these is created for every track and dropped with the
 * engine that owns it, so nothing leaks between sessions.
 */

use std::collections::BTreeSet;

use crate::cue_parser::{parse_cues, Line, RawCue};

/// Ordered, densely indexed lines for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSet {
    lines: Vec<Line>,
}

impl LineSet {
    /// Parse a track's raw cues, dropping degenerate ones
    pub fn from_cues(cues: &[RawCue]) -> Self {
        Self {
            lines: parse_cues(cues),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[Line] {
        &self.lines
    }
}

/// Indices of lines shown at least once. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealState {
    revealed: BTreeSet<usize>,
}

impl RevealState {
    /// Returns true when the index was not revealed before
    pub fn reveal(&mut self, index: usize) -> bool {
        self.revealed.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.revealed.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Revealed indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.revealed.iter().copied()
    }
}

/// The line currently singing and the one that most recently stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveState {
    pub active_index: Option<usize>,
    pub previous_index: Option<usize>,
}

impl ActiveState {
    /// Shift the current line into `previous_index` and install the new one
    pub fn advance(&mut self, next: Option<usize>) {
        self.previous_index = self.active_index;
        self.active_index = next;
    }
}
