/*!
 * Rendering contract and the per-line view bookkeeping that makes every
 * rendering operation idempotent.
 */

use serde::Serialize;

use crate::cue_parser::Line;
use crate::sync::StateChange;

/// Visual state of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineVisual {
    #[default]
    Hidden,
    Revealed,
    Active,
    /// Lost active status, every word forced to sung
    Completing,
    Played,
}

/// Visual state of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordVisual {
    #[default]
    Idle,
    Sung,
}

/// Overall lyrics availability for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LyricsStatus {
    /// Cues have not arrived yet
    Waiting,
    /// A line set is loaded
    Ready { lines: usize },
    /// Terminal: the session has no lyrics to show
    NoLyrics,
}

/// The display the adapter drives.
///
/// Each revealed line gets an owned handle created once; all later updates go
/// through that handle, never through a lookup by synthesized key.
pub trait Renderer {
    type Handle;

    /// Create the presentation for a newly revealed line
    fn create_line(&mut self, line: &Line) -> Self::Handle;

    fn set_line_visual(&mut self, handle: &mut Self::Handle, visual: LineVisual);

    fn set_word_visual(&mut self, handle: &mut Self::Handle, word: usize, visual: WordVisual);

    /// Show the overall lyrics status (placeholder text, spinner, ...)
    fn show_status(&mut self, _status: LyricsStatus) {}

    /// Remove every line created so far; the handles are dropped afterwards
    fn clear(&mut self) {}
}

/// A line's owned handle plus the last state pushed to the renderer
#[derive(Debug)]
pub struct LineView<H> {
    pub handle: H,
    pub visual: LineVisual,
    pub words: Vec<WordVisual>,
}

impl<H> LineView<H> {
    fn set_visual<R: Renderer<Handle = H>>(&mut self, renderer: &mut R, visual: LineVisual) {
        if self.visual != visual {
            self.visual = visual;
            renderer.set_line_visual(&mut self.handle, visual);
        }
    }

    fn set_word<R: Renderer<Handle = H>>(&mut self, renderer: &mut R, word: usize, visual: WordVisual) {
        if let Some(current) = self.words.get_mut(word) {
            if *current != visual {
                *current = visual;
                renderer.set_word_visual(&mut self.handle, word, visual);
            }
        }
    }

    fn set_all_words<R: Renderer<Handle = H>>(&mut self, renderer: &mut R, visual: WordVisual) {
        for word in 0..self.words.len() {
            self.set_word(renderer, word, visual);
        }
    }
}

/// Apply one engine transition to the view map.
///
/// Re-applying a change that is already reflected is a no-op for the renderer.
pub(crate) fn apply_change<R: Renderer>(
    renderer: &mut R,
    views: &mut std::collections::BTreeMap<usize, LineView<R::Handle>>,
    lines: &[Line],
    change: StateChange,
) {
    match change {
        StateChange::LineRevealed(index) => {
            if views.contains_key(&index) {
                return;
            }
            let Some(line) = lines.get(index) else {
                return;
            };
            let mut view = LineView {
                handle: renderer.create_line(line),
                visual: LineVisual::Hidden,
                words: vec![WordVisual::Idle; line.words.len()],
            };
            view.set_visual(renderer, LineVisual::Revealed);
            views.insert(index, view);
        }
        StateChange::LineActivated(index) => {
            if let Some(view) = views.get_mut(&index) {
                // Also sent again after a rewind inside the active line
                view.set_all_words(renderer, WordVisual::Idle);
                view.set_visual(renderer, LineVisual::Active);
            }
        }
        StateChange::LineWillComplete(index) => {
            if let Some(view) = views.get_mut(&index) {
                view.set_all_words(renderer, WordVisual::Sung);
                view.set_visual(renderer, LineVisual::Completing);
            }
        }
        StateChange::LineCompleted(index) => {
            if let Some(view) = views.get_mut(&index) {
                view.set_all_words(renderer, WordVisual::Idle);
                view.set_visual(renderer, LineVisual::Played);
            }
        }
        StateChange::WordActive(index, word) => {
            if let Some(view) = views.get_mut(&index) {
                view.set_word(renderer, word, WordVisual::Sung);
            }
        }
    }
}
