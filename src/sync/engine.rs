/*!
 * Synchronization engine.
 *
 * Called once per playback tick, the engine decides which lines are revealed,
 * which single line is active and which of its words are sung, and reports
 * every transition as a [`StateChange`]. Explicit seeks run the same passes
 * without the completion grace delay.
 */

use std::collections::BTreeSet;

use log::{debug, info, trace};
use serde::Serialize;
use uuid::Uuid;

use crate::app_config::SyncConfig;

use super::state::{ActiveState, LineSet, RevealState};

/// A transition emitted by the engine, consumed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateChange {
    /// The line is shown for the first time
    LineRevealed(usize),
    /// The line becomes the one currently singing
    LineActivated(usize),
    /// The line lost active status; all its words render as sung
    LineWillComplete(usize),
    /// The line settles into the static "played" state
    LineCompleted(usize),
    /// Word `.1` of line `.0` is sung
    WordActive(usize, usize),
}

#[derive(Debug, Clone, Copy)]
struct PendingCompletion {
    line: usize,
    due: f64,
}

/// Engine owning one session's line set and its reveal/active state
#[derive(Debug)]
pub struct SyncEngine {
    session_id: String,
    config: SyncConfig,
    lines: LineSet,
    revealed: RevealState,
    active: ActiveState,
    played: BTreeSet<usize>,
    // Per-word sung flags for the active line's current span
    sung_words: Vec<bool>,
    pending: Vec<PendingCompletion>,
}

impl SyncEngine {
    pub fn new(lines: LineSet, config: SyncConfig) -> Self {
        let session_id = Uuid::new_v4().to_string();
        info!(
            "Starting sync session {} with {} lines",
            &session_id[..8],
            lines.len()
        );
        Self {
            session_id,
            config,
            lines,
            revealed: RevealState::default(),
            active: ActiveState::default(),
            played: BTreeSet::new(),
            sung_words: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn revealed(&self) -> &RevealState {
        &self.revealed
    }

    pub fn active_state(&self) -> ActiveState {
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.active_index
    }

    pub fn is_played(&self, index: usize) -> bool {
        self.played.contains(&index)
    }

    /// Indices of the sung words of the active line, ascending
    pub fn active_words(&self) -> Vec<usize> {
        self.sung_words
            .iter()
            .enumerate()
            .filter_map(|(i, sung)| sung.then_some(i))
            .collect()
    }

    /// Advance to `current_time` during normal playback.
    ///
    /// Ticks that arrive out of order are tolerated: a time at or before one
    /// already processed never un-reveals a line nor un-sings a word of the
    /// line that stays active.
    pub fn tick(&mut self, current_time: f64) -> Vec<StateChange> {
        let Some(time) = sanitize_time(current_time) else {
            trace!("Ignoring non-finite tick {}", current_time);
            return Vec::new();
        };
        trace!("Tick at {:.3}s", time);

        let mut changes = Vec::new();
        self.reveal_through(time, &mut changes);
        self.release_due_completions(time, &mut changes);
        self.resolve_active(time, false, &mut changes);
        // Coarse ticks can step over a short line without ever activating it
        self.complete_skipped(time, &mut changes);
        self.resolve_words(time, &mut changes);
        changes
    }

    /// Jump to `target` after an explicit seek.
    ///
    /// Every line within the lookahead of `target` is revealed at once and the
    /// line active before the seek completes without grace. Revealed lines
    /// that ended before `target` are marked played. When the same line stays
    /// active but `target` lies before some of its sung words, the line is
    /// activated again so its words are re-sung from `target`.
    pub fn seek(&mut self, target: f64) -> Vec<StateChange> {
        let Some(time) = sanitize_time(target) else {
            trace!("Ignoring non-finite seek {}", target);
            return Vec::new();
        };
        debug!(
            "Session {} seeking to {:.3}s",
            &self.session_id[..8],
            time
        );

        let mut changes = Vec::new();
        self.reveal_through(time, &mut changes);
        self.flush_into(&mut changes);
        self.resolve_active(time, true, &mut changes);
        self.rewind_words(time, &mut changes);
        self.complete_skipped(time, &mut changes);
        self.resolve_words(time, &mut changes);
        changes
    }

    /// Emit every grace-delayed completion immediately
    pub fn flush_pending(&mut self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        self.flush_into(&mut changes);
        changes
    }

    fn reveal_through(&mut self, time: f64, changes: &mut Vec<StateChange>) {
        let lookahead = self.config.lookahead_secs;
        for line in self.lines.iter() {
            // Lines are ordered by start, so nothing further can qualify
            if line.start - lookahead > time {
                break;
            }
            if self.revealed.reveal(line.index) {
                debug!("Revealing line {}", line.index);
                changes.push(StateChange::LineRevealed(line.index));
            }
        }
    }

    fn find_active(&self, time: f64) -> Option<usize> {
        let end_slack = self.config.end_slack_secs;
        self.lines
            .iter()
            .rev()
            .filter(|line| self.revealed.contains(line.index))
            .find(|line| time >= line.start && time <= line.end + end_slack)
            .map(|line| line.index)
    }

    fn resolve_active(&mut self, time: f64, immediate: bool, changes: &mut Vec<StateChange>) {
        let next = self.find_active(time);
        if next == self.active.active_index {
            return;
        }

        if let Some(previous) = self.active.active_index {
            changes.push(StateChange::LineWillComplete(previous));
            let grace = self.config.completion_grace_secs;
            if immediate || grace <= 0.0 {
                self.complete(previous, changes);
            } else {
                self.pending.push(PendingCompletion {
                    line: previous,
                    due: time + grace,
                });
            }
        }

        if let Some(index) = next {
            // A line that comes back before its grace elapsed is simply active again
            self.pending.retain(|p| p.line != index);
            self.played.remove(&index);
            let word_count = self.lines.get(index).map_or(0, |l| l.words.len());
            self.sung_words = vec![false; word_count];
            debug!("Activating line {} at {:.3}s", index, time);
            changes.push(StateChange::LineActivated(index));
        } else {
            self.sung_words.clear();
        }

        self.active.advance(next);
    }

    fn resolve_words(&mut self, time: f64, changes: &mut Vec<StateChange>) {
        let Some(index) = self.active.active_index else {
            return;
        };
        let Some(line) = self.lines.get(index) else {
            return;
        };

        for position in 0..line.words.len() {
            if self.sung_words[position] {
                continue;
            }
            let Some(threshold) = self.word_threshold(index, position) else {
                continue;
            };
            if time >= threshold {
                self.sung_words[position] = true;
                changes.push(StateChange::WordActive(index, position));
            }
        }
    }

    fn word_threshold(&self, index: usize, position: usize) -> Option<f64> {
        let line = self.lines.get(index)?;
        let word = line.words.get(position)?;
        if position + 1 == line.words.len() {
            Some(word.time - self.config.word_end_slack_secs)
        } else {
            Some(word.time)
        }
    }

    fn rewind_words(&mut self, time: f64, changes: &mut Vec<StateChange>) {
        let Some(index) = self.active.active_index else {
            return;
        };
        let ahead = self
            .sung_words
            .iter()
            .enumerate()
            .any(|(position, &sung)| {
                sung && self
                    .word_threshold(index, position)
                    .is_some_and(|threshold| threshold > time)
            });
        if !ahead {
            return;
        }

        debug!("Rewinding line {} to {:.3}s", index, time);
        self.sung_words.iter_mut().for_each(|sung| *sung = false);
        changes.push(StateChange::LineActivated(index));
    }

    fn release_due_completions(&mut self, time: f64, changes: &mut Vec<StateChange>) {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| time >= p.due);
        self.pending = waiting;
        for completion in due {
            self.complete(completion.line, changes);
        }
    }

    fn complete_skipped(&mut self, time: f64, changes: &mut Vec<StateChange>) {
        let end_slack = self.config.end_slack_secs;
        let skipped: Vec<usize> = self
            .revealed
            .indices()
            .filter(|&index| Some(index) != self.active.active_index)
            .filter(|index| !self.played.contains(index))
            .filter(|&index| !self.pending.iter().any(|p| p.line == index))
            .filter(|&index| {
                self.lines
                    .get(index)
                    .is_some_and(|line| line.end + end_slack < time)
            })
            .collect();
        for index in skipped {
            self.complete(index, changes);
        }
    }

    fn flush_into(&mut self, changes: &mut Vec<StateChange>) {
        let pending: Vec<_> = self.pending.drain(..).collect();
        for completion in pending {
            self.complete(completion.line, changes);
        }
    }

    fn complete(&mut self, index: usize, changes: &mut Vec<StateChange>) {
        if self.played.insert(index) {
            debug!("Line {} played", index);
            changes.push(StateChange::LineCompleted(index));
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        debug!("Ending sync session {}", &self.session_id[..8]);
    }
}

/// Clamp negative times to zero; reject NaN and infinities
fn sanitize_time(time: f64) -> Option<f64> {
    if time.is_finite() {
        Some(time.max(0.0))
    } else {
        None
    }
}

