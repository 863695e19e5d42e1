/*!
 * Bounded waiting for cue arrival.
 *
 * Cue sources may load their tracks late, or never. The poller checks the
 * source a fixed number of times and then gives up for good, so a track
 * without captions settles on "no lyrics" instead of polling forever.
 */

use std::time::Duration;

use log::{debug, info};
use tokio::sync::watch;

use crate::app_config::PollConfig;
use crate::cue_parser::RawCue;

use super::sources::TimedCueSource;

/// Where the poller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling { attempts: u32 },
    Ready,
    GaveUp,
    Cancelled,
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Nothing yet, keep polling
    Pending,
    /// The first loaded track's cues
    Ready(Vec<RawCue>),
    /// The wait window is exhausted
    GaveUp,
    /// The poller already reached a terminal state
    Finished,
}

/// Outcome of [`wait_for_cues`]
#[derive(Debug, Clone, PartialEq)]
pub enum CueWait {
    Ready(Vec<RawCue>),
    GaveUp,
    Cancelled,
}

/// Check-and-count state machine driven by the host's timer
#[derive(Debug, Clone)]
pub struct CuePoller {
    max_attempts: u32,
    state: PollState,
}

impl CuePoller {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            state: PollState::Polling { attempts: 0 },
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, PollState::Polling { .. })
    }

    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.state = PollState::Cancelled;
        }
    }

    /// Record cues that arrived through a push notification
    pub fn mark_ready(&mut self) {
        if !self.is_finished() {
            self.state = PollState::Ready;
        }
    }

    /// Check the source once, consuming one attempt
    pub fn check<C: TimedCueSource + ?Sized>(&mut self, source: &C) -> PollOutcome {
        let PollState::Polling { attempts } = self.state else {
            return PollOutcome::Finished;
        };

        if let Some(cues) = source.loaded_cues() {
            debug!("Cues available after {} checks", attempts + 1);
            self.state = PollState::Ready;
            return PollOutcome::Ready(cues);
        }

        let attempts = attempts + 1;
        if attempts >= self.max_attempts {
            info!("No cues after {} checks, giving up", attempts);
            self.state = PollState::GaveUp;
            return PollOutcome::GaveUp;
        }

        self.state = PollState::Polling { attempts };
        PollOutcome::Pending
    }
}

/// Poll `source` on a fixed interval until cues load, the window runs out,
/// or `cancel` flips to true (or its sender is dropped).
pub async fn wait_for_cues<C: TimedCueSource + ?Sized>(
    source: &C,
    config: &PollConfig,
    mut cancel: watch::Receiver<bool>,
) -> CueWait {
    let mut poller = CuePoller::new(config);
    let mut interval = tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));

    loop {
        if *cancel.borrow() {
            poller.cancel();
            return CueWait::Cancelled;
        }

        tokio::select! {
            _ = interval.tick() => {
                match poller.check(source) {
                    PollOutcome::Ready(cues) => return CueWait::Ready(cues),
                    PollOutcome::GaveUp => return CueWait::GaveUp,
                    PollOutcome::Pending => continue,
                    PollOutcome::Finished => return CueWait::Cancelled,
                }
            }
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    poller.cancel();
                    return CueWait::Cancelled;
                }
            }
        }
    }
}
