/*!
 * Integration tests for the presentation adapter lifecycle
 */

use lyricsync::app_config::{Config, PollConfig};
use lyricsync::cue_parser::RawCue;
use lyricsync::presentation::{
    LineVisual, LyricsStatus, PlaybackSource, PresentationAdapter, TextTrack, WordVisual,
};
use lyricsync::simulation::{DelayedCueSource, SimulatedPlayer};
use lyricsync::vtt_processor::parse_vtt_str;
use crate::common::{self, RecordingRenderer, RenderOp};

fn karaoke_cues() -> Vec<RawCue> {
    parse_vtt_str(common::KARAOKE_VTT).unwrap()
}

fn new_adapter(config: Config) -> PresentationAdapter<RecordingRenderer> {
    common::init_logging();
    let mut adapter = PresentationAdapter::new(RecordingRenderer::default(), config);
    adapter.start_session();
    adapter
}

fn loaded_adapter(player: &SimulatedPlayer) -> PresentationAdapter<RecordingRenderer> {
    let mut adapter = new_adapter(Config::default());
    adapter.load_cues(&karaoke_cues(), player);
    adapter
}

/// Repeated notifications before cues load are harmless, later ones are ignored
#[test]
fn test_on_cues_available_withLateCues_shouldLoadOnceAndIgnoreLaterNotifications() {
    let mut adapter = new_adapter(Config::default());
    let player = SimulatedPlayer::new(20.0);
    let source = DelayedCueSource::delayed(vec![TextTrack::new("en", karaoke_cues())], 2);

    assert_eq!(adapter.on_cues_available(&source, &player), LyricsStatus::Waiting);
    assert_eq!(adapter.on_cues_available(&source, &player), LyricsStatus::Waiting);
    assert_eq!(
        adapter.on_cues_available(&source, &player),
        LyricsStatus::Ready { lines: 3 }
    );
    assert_eq!(source.checks(), 3);

    assert_eq!(
        adapter.on_cues_available(&source, &player),
        LyricsStatus::Ready { lines: 3 }
    );
    assert_eq!(source.checks(), 3);
    assert_eq!(
        adapter.renderer().statuses,
        vec![LyricsStatus::Waiting, LyricsStatus::Ready { lines: 3 }]
    );

    // Playback at zero: only the first line is within lookahead
    assert_eq!(adapter.line_visual(0), LineVisual::Revealed);
    assert_eq!(adapter.line_visual(1), LineVisual::Hidden);
}

/// Exhausting the poll window settles on "no lyrics" for good
#[test]
fn test_on_poll_timer_withNoCues_shouldSettleOnNoLyrics() {
    let config = Config {
        polling: PollConfig {
            interval_ms: 100,
            max_wait_ms: 200,
        },
        ..Config::default()
    };
    let mut adapter = new_adapter(config);
    let player = SimulatedPlayer::new(20.0);
    let empty = DelayedCueSource::single("en", Vec::new());

    assert_eq!(adapter.on_poll_timer(&empty, &player), LyricsStatus::Waiting);
    assert_eq!(adapter.on_poll_timer(&empty, &player), LyricsStatus::Waiting);
    assert_eq!(adapter.on_poll_timer(&empty, &player), LyricsStatus::NoLyrics);

    let late = DelayedCueSource::single("en", karaoke_cues());
    assert_eq!(adapter.on_cues_available(&late, &player), LyricsStatus::NoLyrics);
    assert_eq!(adapter.load_cues(&karaoke_cues(), &player), LyricsStatus::NoLyrics);
    assert!(adapter.engine().is_none());
    assert_eq!(
        adapter.renderer().statuses,
        vec![LyricsStatus::Waiting, LyricsStatus::NoLyrics]
    );
}

/// Cues that all turn out degenerate leave the track without lyrics
#[test]
fn test_load_cues_withOnlyDegenerateCues_shouldReportNoLyrics() {
    let mut adapter = new_adapter(Config::default());
    let player = SimulatedPlayer::new(20.0);
    let source = DelayedCueSource::single(
        "en",
        vec![RawCue::new(3.0, 1.0, "inverted"), RawCue::new(0.0, 1.0, "   ")],
    );

    assert_eq!(adapter.on_cues_available(&source, &player), LyricsStatus::NoLyrics);
    assert!(adapter.engine().is_none());
    assert!(adapter.renderer().ops.is_empty());
}

/// Time updates before any cues do nothing
#[test]
fn test_on_time_update_beforeCues_shouldDoNothing() {
    let mut adapter = new_adapter(Config::default());
    let mut player = SimulatedPlayer::new(20.0);
    player.seek(5.0);

    assert!(adapter.on_time_update(&player).is_empty());
    assert!(adapter.on_seek(&player).is_empty());
    assert!(adapter.flush().is_empty());
    assert!(adapter.renderer().ops.is_empty());
}

/// Cues arriving mid-playback are synced to the current position at once
#[test]
fn test_load_cues_duringPlayback_shouldCatchUpToCurrentTime() {
    let mut player = SimulatedPlayer::new(20.0);
    player.seek(5.0);

    let adapter = loaded_adapter(&player);

    assert_eq!(adapter.line_visual(0), LineVisual::Played);
    assert_eq!(adapter.line_visual(1), LineVisual::Active);
    assert_eq!(adapter.word_visuals(1), vec![WordVisual::Sung, WordVisual::Idle]);
    assert_eq!(adapter.line_visual(2), LineVisual::Hidden);
}

/// Repeating a time or seek notification produces no extra rendering
#[test]
fn test_notifications_withSameTime_shouldBeIdempotent() {
    let mut player = SimulatedPlayer::new(20.0);
    let mut adapter = loaded_adapter(&player);

    adapter.seek_to(&mut player, 2.0);
    let ops = adapter.renderer().ops.len();

    assert!(adapter.on_time_update(&player).is_empty());
    assert!(adapter.on_time_update(&player).is_empty());
    assert!(adapter.on_seek(&player).is_empty());
    assert_eq!(adapter.renderer().ops.len(), ops);
}

/// Seek targets are clamped into the media range
#[test]
fn test_seek_to_withOutOfRangeTargets_shouldClamp() {
    let mut player = SimulatedPlayer::new(20.0);
    let mut adapter = loaded_adapter(&player);

    adapter.seek_to(&mut player, 50.0);
    assert_eq!(player.current_time(), 20.0);
    assert_eq!(adapter.line_visual(2), LineVisual::Played);

    adapter.seek_to(&mut player, -3.0);
    assert_eq!(player.current_time(), 0.0);

    adapter.seek_to(&mut player, f64::NAN);
    assert_eq!(player.current_time(), 0.0);
    assert_eq!(adapter.engine().unwrap().revealed().len(), 3);
}

/// Only revealed lines can be jumped to, and jumping resumes playback
#[test]
fn test_jump_to_line_shouldSeekToRevealedLineStart() {
    let mut player = SimulatedPlayer::new(20.0);
    let mut adapter = loaded_adapter(&player);

    assert_eq!(adapter.jump_to_line(&mut player, 2), None);
    assert_eq!(adapter.jump_to_line(&mut player, 9), None);
    assert!(player.is_paused());

    adapter.seek_to(&mut player, 4.0);
    assert_eq!(adapter.line_visual(0), LineVisual::Active);

    assert_eq!(adapter.jump_to_line(&mut player, 1), Some(4.5));
    assert!(!player.is_paused());
    assert_eq!(adapter.line_visual(0), LineVisual::Played);
    assert_eq!(adapter.line_visual(1), LineVisual::Active);
    assert_eq!(adapter.line_handle(1), Some(&1));
}

/// Switching tracks discards everything from the previous session
#[test]
fn test_start_session_afterPlayback_shouldDiscardPreviousState() {
    let mut player = SimulatedPlayer::new(20.0);
    let mut adapter = loaded_adapter(&player);
    adapter.seek_to(&mut player, 10.0);
    let first_session = adapter.engine().unwrap().session_id().to_string();

    adapter.start_session();

    assert_eq!(adapter.renderer().ops.last(), Some(&RenderOp::Clear));
    assert!(adapter.engine().is_none());
    assert_eq!(adapter.status(), LyricsStatus::Waiting);
    assert_eq!(adapter.line_visual(0), LineVisual::Hidden);
    assert_eq!(adapter.renderer().statuses.last(), Some(&LyricsStatus::Waiting));

    let status = adapter.load_cues(&common::back_to_back_cues(2, 5.0), &player);

    assert_eq!(status, LyricsStatus::Ready { lines: 2 });
    let engine = adapter.engine().unwrap();
    assert_ne!(engine.session_id(), first_session);
    assert_eq!(engine.lines().len(), 2);
    assert_eq!(engine.active_index(), Some(1));
    assert_eq!(adapter.line_visual(0), LineVisual::Played);
    assert_eq!(adapter.line_visual(1), LineVisual::Active);
}

/// A fresh adapter has nothing on screen to clear
#[test]
fn test_start_session_withoutLines_shouldNotClearRenderer() {
    let mut adapter = new_adapter(Config::default());

    adapter.start_session();

    assert!(!adapter.renderer().ops.contains(&RenderOp::Clear));
}

/// Seeking back inside the singing line resets the words after the target
#[test]
fn test_seek_to_backwardWithinActiveLine_shouldResetLaterWords() {
    let mut player = SimulatedPlayer::new(20.0);
    let mut adapter = loaded_adapter(&player);

    adapter.seek_to(&mut player, 3.5);
    assert_eq!(adapter.word_visuals(0), vec![WordVisual::Sung; 3]);

    adapter.seek_to(&mut player, 1.5);

    assert_eq!(adapter.line_visual(0), LineVisual::Active);
    assert_eq!(
        adapter.word_visuals(0),
        vec![WordVisual::Sung, WordVisual::Idle, WordVisual::Idle]
    );
}
