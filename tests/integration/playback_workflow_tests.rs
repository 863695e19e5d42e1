/*!
 * End-to-end playback of caption files through the adapter
 */

use tokio::sync::watch;

use lyricsync::app_config::Config;
use lyricsync::presentation::{
    wait_for_cues, CueWait, LineVisual, PlaybackSource, PresentationAdapter, WordVisual,
};
use lyricsync::simulation::SimulatedPlayer;
use lyricsync::sync::StateChange;
use lyricsync::vtt_processor::VttTrack;
use crate::common::{self, RecordingRenderer, RenderOp};

fn position_of(ops: &[RenderOp], wanted: &RenderOp) -> Option<usize> {
    ops.iter().position(|op| op == wanted)
}

/// A full pass over a caption file reveals, sings and retires every line in order
#[tokio::test]
async fn test_full_playback_withKaraokeFile_shouldPlayEveryLine() -> anyhow::Result<()> {
    common::init_logging();
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "song.vtt", common::KARAOKE_VTT)?;
    let track = VttTrack::load(&path)?;
    let config = Config::default();

    let mut player = SimulatedPlayer::new(13.0);
    let mut adapter = PresentationAdapter::new(RecordingRenderer::default(), config.clone());
    adapter.start_session();

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let CueWait::Ready(cues) = wait_for_cues(&track, &config.polling, cancel_rx).await else {
        panic!("cues should be available immediately");
    };
    adapter.load_cues(&cues, &player);

    let mut changes = Vec::new();
    player.play();
    while player.advance(0.1) {
        changes.extend(adapter.on_time_update(&player));
    }
    changes.extend(adapter.on_time_update(&player));
    changes.extend(adapter.flush());

    assert!(player.has_ended());
    for index in 0..3 {
        assert_eq!(adapter.line_visual(index), LineVisual::Played, "line {}", index);
        assert!(adapter
            .word_visuals(index)
            .iter()
            .all(|w| *w == WordVisual::Idle));

        let revealed = changes.iter().position(|c| *c == StateChange::LineRevealed(index));
        let activated = changes.iter().position(|c| *c == StateChange::LineActivated(index));
        assert!(revealed.is_some() && revealed < activated, "line {}", index);
    }

    let word_events = changes
        .iter()
        .filter(|c| matches!(c, StateChange::WordActive(..)))
        .count();
    assert_eq!(word_events, 3 + 2 + 4);

    let ops = &adapter.renderer().ops;
    for index in 0..3 {
        let created = position_of(ops, &RenderOp::Create(index));
        let active = position_of(ops, &RenderOp::Line(index, LineVisual::Active));
        assert!(created.is_some() && created < active);
    }
    let sung = ops
        .iter()
        .filter(|op| matches!(op, RenderOp::Word(_, _, WordVisual::Sung)))
        .count();
    assert_eq!(sung, 9);
    Ok(())
}

/// Seeking over a line mid-song marks it played without singing it
#[tokio::test]
async fn test_playback_withForwardSeek_shouldSkipIntermediateLine() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "song.vtt", common::KARAOKE_VTT)?;
    let track = VttTrack::load(&path)?;
    let config = Config::default();

    let mut player = SimulatedPlayer::new(13.0);
    let mut adapter = PresentationAdapter::new(RecordingRenderer::default(), config.clone());
    adapter.start_session();

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let CueWait::Ready(cues) = wait_for_cues(&track, &config.polling, cancel_rx).await else {
        panic!("cues should be available immediately");
    };
    adapter.load_cues(&cues, &player);

    player.play();
    while player.current_time() < 2.5 {
        player.advance(0.25);
        adapter.on_time_update(&player);
    }
    assert_eq!(adapter.line_visual(0), LineVisual::Active);

    adapter.seek_to(&mut player, 10.0);

    assert_eq!(adapter.line_visual(0), LineVisual::Played);
    assert_eq!(adapter.line_visual(1), LineVisual::Played);
    assert_eq!(adapter.line_visual(2), LineVisual::Active);
    assert_eq!(
        adapter.word_visuals(2),
        vec![WordVisual::Sung, WordVisual::Sung, WordVisual::Idle, WordVisual::Idle]
    );
    assert!(!adapter
        .renderer()
        .ops
        .iter()
        .any(|op| matches!(op, RenderOp::Word(1, _, WordVisual::Sung))));
    Ok(())
}
