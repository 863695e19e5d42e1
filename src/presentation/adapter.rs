/*!
 * Presentation adapter.
 *
 * Wires the playback clock, seek notifications and cue arrival into the
 * synchronization engine and turns its transitions into rendering operations.
 * The adapter never touches engine state directly: it only calls `tick` and
 * `seek` and reads the results.
 */

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::app_config::Config;
use crate::cue_parser::RawCue;
use crate::sync::{LineSet, StateChange, SyncEngine};

use super::cue_poller::{CuePoller, PollOutcome};
use super::render::{apply_change, LineView, LineVisual, LyricsStatus, Renderer, WordVisual};
use super::sources::{PlaybackSource, TimedCueSource};

/// Everything that belongs to one track. Replaced wholesale on track change.
struct Session<H> {
    engine: Option<SyncEngine>,
    poller: CuePoller,
    views: BTreeMap<usize, LineView<H>>,
    status: LyricsStatus,
}

/// Drives a [`Renderer`] from playback and cue events
pub struct PresentationAdapter<R: Renderer> {
    config: Config,
    renderer: R,
    session: Session<R::Handle>,
}

impl<R: Renderer> PresentationAdapter<R> {
    /// Create an adapter with an empty session waiting for cues
    pub fn new(renderer: R, config: Config) -> Self {
        let session = Session {
            engine: None,
            poller: CuePoller::new(&config.polling),
            views: BTreeMap::new(),
            status: LyricsStatus::Waiting,
        };
        Self {
            config,
            renderer,
            session,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn status(&self) -> LyricsStatus {
        self.session.status
    }

    /// Read-only view of the current session's engine
    pub fn engine(&self) -> Option<&SyncEngine> {
        self.session.engine.as_ref()
    }

    pub fn line_visual(&self, index: usize) -> LineVisual {
        self.session
            .views
            .get(&index)
            .map_or(LineVisual::Hidden, |view| view.visual)
    }

    pub fn word_visuals(&self, index: usize) -> Vec<WordVisual> {
        self.session
            .views
            .get(&index)
            .map(|view| view.words.clone())
            .unwrap_or_default()
    }

    /// Handle of a revealed line, if any
    pub fn line_handle(&self, index: usize) -> Option<&R::Handle> {
        self.session.views.get(&index).map(|view| &view.handle)
    }

    /// Discard the current session and start waiting for a new track's cues.
    ///
    /// The renderer is told to clear its lines first. The old line set, reveal
    /// and active state then go away in one assignment, before anything from
    /// the new track can be accepted.
    pub fn start_session(&mut self) {
        if !self.session.views.is_empty() {
            debug!("Clearing {} lines of the previous track", self.session.views.len());
            self.renderer.clear();
        }
        self.session = Session {
            engine: None,
            poller: CuePoller::new(&self.config.polling),
            views: BTreeMap::new(),
            status: LyricsStatus::Waiting,
        };
        self.renderer.show_status(LyricsStatus::Waiting);
    }

    /// Push notification that a cue source has tracks ready.
    ///
    /// Ignored once a line set exists or the session gave up; tolerated any
    /// number of times before that.
    pub fn on_cues_available<C, P>(&mut self, source: &C, playback: &P) -> LyricsStatus
    where
        C: TimedCueSource + ?Sized,
        P: PlaybackSource + ?Sized,
    {
        if self.session.poller.is_finished() {
            debug!("Ignoring cue notification, session already settled");
            return self.session.status;
        }

        match source.loaded_cues() {
            Some(cues) => {
                self.session.poller.mark_ready();
                self.load_cues(&cues, playback)
            }
            None => {
                debug!("Cue notification without loaded cues");
                self.session.status
            }
        }
    }

    /// Timer-driven check of the cue source, bounded by the poll config
    pub fn on_poll_timer<C, P>(&mut self, source: &C, playback: &P) -> LyricsStatus
    where
        C: TimedCueSource + ?Sized,
        P: PlaybackSource + ?Sized,
    {
        match self.session.poller.check(source) {
            PollOutcome::Ready(cues) => self.load_cues(&cues, playback),
            PollOutcome::GaveUp => self.settle(LyricsStatus::NoLyrics),
            PollOutcome::Pending | PollOutcome::Finished => self.session.status,
        }
    }

    /// Install cues obtained out of band (e.g. from [`super::wait_for_cues`])
    pub fn load_cues<P: PlaybackSource + ?Sized>(&mut self, cues: &[RawCue], playback: &P) -> LyricsStatus {
        if self.session.engine.is_some() || self.session.status == LyricsStatus::NoLyrics {
            return self.session.status;
        }
        self.session.poller.mark_ready();

        let lines = LineSet::from_cues(cues);
        if lines.is_empty() {
            warn!("Track delivered {} cues but no usable lines", cues.len());
            return self.settle(LyricsStatus::NoLyrics);
        }

        let status = LyricsStatus::Ready { lines: lines.len() };
        self.session.engine = Some(SyncEngine::new(lines, self.config.sync.clone()));
        self.settle(status);

        // Playback may be anywhere by the time cues arrive
        self.sync_to(playback.clamp_time(playback.current_time()));
        status
    }

    /// Session lost its track for good: no cues will be accepted anymore
    pub fn give_up(&mut self) -> LyricsStatus {
        self.session.poller.cancel();
        self.settle(LyricsStatus::NoLyrics)
    }

    /// Periodic time notification from the playback source
    pub fn on_time_update<P: PlaybackSource + ?Sized>(&mut self, playback: &P) -> Vec<StateChange> {
        let time = playback.current_time();
        let changes = match self.session.engine.as_mut() {
            Some(engine) => engine.tick(time),
            None => return Vec::new(),
        };
        self.apply(&changes);
        changes
    }

    /// Seek notification from the playback source
    pub fn on_seek<P: PlaybackSource + ?Sized>(&mut self, playback: &P) -> Vec<StateChange> {
        self.sync_to(playback.clamp_time(playback.current_time()))
    }

    /// Reposition playback, clamped into `[0, duration]`, and resync
    pub fn seek_to<P: PlaybackSource + ?Sized>(&mut self, playback: &mut P, time: f64) -> Vec<StateChange> {
        let target = playback.clamp_time(time);
        if target != time {
            debug!("Clamped seek from {} to {:.3}s", time, target);
        }
        playback.seek(target);
        self.sync_to(target)
    }

    /// User clicked a revealed line: jump to its start and resume playback
    pub fn jump_to_line<P: PlaybackSource + ?Sized>(&mut self, playback: &mut P, index: usize) -> Option<f64> {
        if !self.session.views.contains_key(&index) {
            return None;
        }
        let start = self
            .session
            .engine
            .as_ref()
            .and_then(|engine| engine.lines().get(index))
            .map(|line| line.start)?;

        info!("Jumping to line {} at {:.3}s", index, start);
        self.seek_to(playback, start);
        if playback.is_paused() {
            playback.play();
        }
        Some(playback.current_time())
    }

    /// Emit grace-delayed completions right away (e.g. at end of media)
    pub fn flush(&mut self) -> Vec<StateChange> {
        let changes = match self.session.engine.as_mut() {
            Some(engine) => engine.flush_pending(),
            None => return Vec::new(),
        };
        self.apply(&changes);
        changes
    }

    fn sync_to(&mut self, time: f64) -> Vec<StateChange> {
        let changes = match self.session.engine.as_mut() {
            Some(engine) => engine.seek(time),
            None => return Vec::new(),
        };
        self.apply(&changes);
        changes
    }

    fn apply(&mut self, changes: &[StateChange]) {
        let Some(engine) = self.session.engine.as_ref() else {
            return;
        };
        let lines = engine.lines().as_slice();
        for &change in changes {
            apply_change(&mut self.renderer, &mut self.session.views, lines, change);
        }
    }

    fn settle(&mut self, status: LyricsStatus) -> LyricsStatus {
        if self.session.status != status {
            info!("Lyrics status: {:?}", status);
            self.session.status = status;
            self.renderer.show_status(status);
        }
        status
    }
}
