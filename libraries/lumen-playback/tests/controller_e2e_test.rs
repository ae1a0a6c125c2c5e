//! End-to-end tests for SessionController
//!
//! Covers:
//! - Playlist attachment and content kinds
//! - Session lifecycle (start idempotency, stop/start round trip)
//! - Playback rate policy
//! - Track change titles
//! - Error recovery (live-window drift vs. user-facing failures)
//! - Saved state

mod common;

use common::{controller, item, two_items, EngineRegistry};
use lumen_playback::{
    BehindLiveWindow, ContentKind, DecoderInitError, EngineError, EngineEvent, EngineState,
    PlaybackConfig, PlaybackError, RecoveryAction, SelectionSnapshot, SessionState,
    SourceLoadError, StartPosition, SurfaceUpdate, TrackGroup, TrackGroups, TrackKind,
    TrackParameters,
};
use serde_json::json;

fn video_groups(format: &str) -> TrackGroups {
    TrackGroups::new(vec![
        TrackGroup::new(TrackKind::Video, [format]),
        TrackGroup::new(TrackKind::Audio, ["mp4a.40.2"]),
    ])
}

fn ready() -> EngineEvent {
    EngineEvent::StateChanged {
        auto_play: true,
        state: EngineState::Ready,
    }
}

// ============================================================================
// Playlist attachment
// ============================================================================

#[test]
fn start_attaches_adaptive_and_progressive_entries() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    controller.start(two_items(), None);

    let engine = registry.latest();
    let engine = engine.borrow();
    let entries = engine.prepared.as_ref().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 0);
    assert_eq!(entries[0].content_kind, ContentKind::Adaptive);
    assert_eq!(entries[1].index, 1);
    assert_eq!(entries[1].content_kind, ContentKind::Progressive);
    assert_eq!(engine.prepare_calls, 1);
    assert_eq!(engine.handle_audio_focus, Some(true));
    assert!(engine.auto_play);
}

#[test]
fn empty_playlist_reaches_nothing_to_play() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    controller.start(Vec::new(), None);

    assert_eq!(controller.attached_len(), Some(0));
    assert!(controller.surface().contains(&SurfaceUpdate::NothingToPlay));
    assert!(controller.surface().contains(&SurfaceUpdate::ShowControls));
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[test]
fn start_is_idempotent_while_live() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    controller.start(two_items(), None);
    controller.handle_engine_event(ready());
    controller.start(vec![item("c.mp3", "C")], None);

    assert_eq!(registry.created(), 1);
    assert_eq!(controller.state(), SessionState::Active);
    assert_eq!(controller.items(), two_items().as_slice());
    assert_eq!(registry.latest().borrow().prepare_calls, 1);
}

#[test]
fn stop_without_session_returns_default_snapshot() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    let snapshot = controller.stop();

    assert_eq!(snapshot, SelectionSnapshot::default());
    assert_eq!(registry.created(), 0);
    assert_eq!(controller.state(), SessionState::Empty);
}

#[test]
fn stop_then_start_resumes_at_same_place() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    {
        let engine = registry.latest();
        let mut engine = engine.borrow_mut();
        engine.window_index = 1;
        engine.position_ms = 42_000;
        engine.auto_play = false;
        engine.parameters = TrackParameters::from_value(json!({"max_height": 720}));
    }

    let snapshot = controller.stop();
    assert!(registry.engine(0).borrow().released);
    assert_eq!(controller.state(), SessionState::Empty);
    assert_eq!(
        snapshot.start_position,
        Some(StartPosition {
            window_index: 1,
            position_ms: 42_000
        })
    );

    controller.start(two_items(), Some(snapshot));

    let engine = registry.latest();
    let engine = engine.borrow();
    assert_eq!(registry.created(), 2);
    assert_eq!(engine.seeks, vec![(1, 42_000)]);
    assert!(!engine.auto_play);
    assert_eq!(engine.parameters.as_value(), &json!({"max_height": 720}));
}

#[test]
fn negative_position_is_clamped_on_stop() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    registry.latest().borrow_mut().position_ms = -250;

    let snapshot = controller.stop();
    assert_eq!(
        snapshot.start_position,
        Some(StartPosition {
            window_index: 0,
            position_ms: 0
        })
    );

    controller.start(two_items(), Some(snapshot));
    assert_eq!(registry.latest().borrow().seeks, vec![(0, 0)]);
}

#[test]
fn stop_twice_returns_last_captured_snapshot() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    registry.latest().borrow_mut().position_ms = 9_000;

    let first = controller.stop();
    let second = controller.stop();

    assert_eq!(first, second);
    assert_eq!(registry.created(), 1);
}

#[test]
fn new_intent_discards_position_but_keeps_track_parameters() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    {
        let engine = registry.latest();
        let mut engine = engine.borrow_mut();
        engine.position_ms = 5_000;
        engine.parameters = TrackParameters::from_value(json!({"lang": "ja"}));
    }

    controller.replace_items(vec![item("next.mp4", "Next")]);
    assert!(!controller.is_live());
    assert_eq!(controller.snapshot().start_position, None);

    controller.resume();
    let engine = registry.latest();
    assert!(engine.borrow().seeks.is_empty());
    assert_eq!(engine.borrow().parameters.as_value(), &json!({"lang": "ja"}));
    assert_eq!(controller.items()[0].title(), "Next");
}

#[test]
fn never_more_than_one_live_engine() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    for _ in 0..3 {
        controller.start(two_items(), None);
        controller.start(two_items(), None);
        assert_eq!(registry.live(), 1);
        controller.stop();
        assert_eq!(registry.live(), 0);
    }
    assert_eq!(registry.created(), 3);
}

#[test]
fn ended_shows_controls() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    controller.handle_engine_event(EngineEvent::StateChanged {
        auto_play: true,
        state: EngineState::Ended,
    });

    assert_eq!(controller.surface().last(), Some(&SurfaceUpdate::ShowControls));
}

#[test]
fn events_without_session_are_ignored() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    controller.handle_engine_event(ready());
    controller.handle_engine_event(EngineEvent::TracksChanged {
        groups: video_groups("avc1"),
        current_tag: Some(0),
    });

    assert_eq!(controller.state(), SessionState::Empty);
    assert!(controller.surface().is_empty());
}

#[test]
fn errors_after_stop_are_ignored() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    controller.stop();
    let shown_before = controller.surface().len();

    controller.handle_engine_event(EngineEvent::Error(EngineError::source_stage(
        BehindLiveWindow,
    )));
    controller.handle_engine_event(EngineEvent::Error(EngineError::renderer(
        DecoderInitError::missing("video/hevc"),
    )));

    assert_eq!(registry.created(), 1);
    assert_eq!(registry.live(), 0);
    assert_eq!(controller.state(), SessionState::Empty);
    assert_eq!(controller.surface().len(), shown_before);
    assert!(!controller
        .surface()
        .iter()
        .any(|u| matches!(u, SurfaceUpdate::ErrorMessage(_))));

    let action = controller.on_engine_error(&EngineError::source_stage(BehindLiveWindow));
    assert_eq!(action, RecoveryAction::Ignored);
    assert_eq!(registry.created(), 1);
}

// ============================================================================
// Playback rate
// ============================================================================

#[test]
fn cycle_rate_from_one() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    let rates: Vec<f32> = (0..3).map(|_| controller.cycle_rate()).collect();

    assert_eq!(rates, vec![1.5, 0.8, 1.0]);
    assert_eq!(registry.latest().borrow().rate_changes, vec![1.5, 0.8, 1.0]);
    assert_eq!(
        controller.surface().last(),
        Some(&SurfaceUpdate::RateLabel("x1.0".to_string()))
    );
}

#[test]
fn invalid_rate_is_rejected_and_previous_kept() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    controller.set_playback_rate(1.5).unwrap();

    for rate in [0.49, 2.01, 0.0, -1.0, f32::NAN] {
        assert!(matches!(
            controller.set_playback_rate(rate),
            Err(PlaybackError::InvalidRate(_))
        ));
    }

    assert_eq!(controller.playback_rate(), 1.5);
    assert_eq!(registry.latest().borrow().rate, 1.5);
    assert_eq!(registry.latest().borrow().rate_changes, vec![1.5]);
}

#[test]
fn same_rate_is_not_reapplied() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    controller.set_playback_rate(1.0).unwrap();

    assert!(registry.latest().borrow().rate_changes.is_empty());
}

#[test]
fn rate_matching_the_engine_is_still_recorded() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    registry.latest().borrow_mut().rate = 1.5;

    controller.set_playback_rate(1.5).unwrap();

    assert!(registry.latest().borrow().rate_changes.is_empty());
    assert_eq!(controller.playback_rate(), 1.5);

    let snapshot = controller.stop();
    controller.start(two_items(), Some(snapshot));
    assert_eq!(registry.latest().borrow().rate, 1.5);
}

#[test]
fn rate_survives_stop_start() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    controller.set_playback_rate(1.5).unwrap();

    let snapshot = controller.stop();
    controller.start(two_items(), Some(snapshot));

    assert_eq!(registry.latest().borrow().rate, 1.5);
    assert_eq!(controller.playback_rate(), 1.5);
}

#[test]
fn rate_set_without_session_applies_at_next_start() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());

    controller.set_playback_rate(0.8).unwrap();
    controller.start(two_items(), None);

    assert_eq!(registry.latest().borrow().rate_changes, vec![0.8]);
    assert!(controller
        .surface()
        .contains(&SurfaceUpdate::RateLabel("x0.8".to_string())));
}

// ============================================================================
// Track changes
// ============================================================================

#[test]
fn track_change_shows_title_hidden_for_video() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(vec![item("clip.mp4", "Clip"), item("song.mp3", "Song")], None);

    controller.on_track_groups_changed(video_groups("avc1"), Some(0));
    assert_eq!(
        controller.surface().last(),
        Some(&SurfaceUpdate::Title {
            text: "Clip".to_string(),
            visible: false
        })
    );

    let audio = TrackGroups::new(vec![TrackGroup::new(TrackKind::Audio, ["mp3"])]);
    controller.on_track_groups_changed(audio, Some(1));
    assert_eq!(
        controller.surface().last(),
        Some(&SurfaceUpdate::Title {
            text: "Song".to_string(),
            visible: true
        })
    );
}

#[test]
fn repeated_track_groups_are_ignored() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    let before = controller.surface().len();

    controller.on_track_groups_changed(video_groups("avc1"), Some(0));
    controller.on_track_groups_changed(video_groups("avc1"), Some(1));

    assert_eq!(controller.surface().len(), before + 1);

    controller.on_track_groups_changed(video_groups("hvc1"), Some(1));
    assert_eq!(controller.surface().len(), before + 2);
}

#[test]
fn track_tag_maps_to_input_position_across_skipped_items() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(
        vec![
            item("https://cdn.test/live.mpd", "Dash"),
            item("https://cdn.test/talk.m4a", "Talk"),
        ],
        None,
    );

    let tag = registry.latest().borrow().prepared.as_ref().unwrap()[0].index;
    controller.handle_engine_event(EngineEvent::TracksChanged {
        groups: TrackGroups::new(vec![TrackGroup::new(TrackKind::Audio, ["mp4a"])]),
        current_tag: Some(tag),
    });

    assert_eq!(
        controller.surface().last(),
        Some(&SurfaceUpdate::Title {
            text: "Talk".to_string(),
            visible: true
        })
    );
}

#[test]
fn unknown_tag_updates_nothing() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    let before = controller.surface().len();

    controller.on_track_groups_changed(video_groups("avc1"), Some(7));
    controller.on_track_groups_changed(video_groups("hvc1"), None);

    assert_eq!(controller.surface().len(), before);
}

#[test]
fn fresh_session_forgets_last_seen_groups() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    controller.on_track_groups_changed(video_groups("avc1"), Some(1));

    let snapshot = controller.stop();
    controller.start(two_items(), Some(snapshot));
    let before = controller.surface().len();
    controller.on_track_groups_changed(video_groups("avc1"), Some(1));

    assert_eq!(controller.surface().len(), before + 1);
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn live_window_drift_restarts_at_live_edge() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(
        vec![item("https://live.test/channel.m3u8", "Live")],
        Some(SelectionSnapshot {
            track_parameters: TrackParameters::from_value(json!({"max_bitrate": 800_000})),
            auto_play: false,
            start_position: Some(StartPosition {
                window_index: 0,
                position_ms: 120_000,
            }),
        }),
    );
    controller.handle_engine_event(ready());

    // User changed quality on the live engine; not captured yet
    registry.latest().borrow_mut().parameters =
        TrackParameters::from_value(json!({"max_bitrate": 4_000_000}));

    let error = EngineError::source_stage(SourceLoadError::caused_by(
        "segment fetch",
        SourceLoadError::caused_by("playlist refresh", BehindLiveWindow),
    ));
    let action = controller.on_engine_error(&error);

    assert_eq!(action, RecoveryAction::Reinitialized);
    assert_eq!(registry.created(), 2);
    assert_eq!(registry.live(), 1);
    assert!(registry.engine(0).borrow().released);

    let engine = registry.latest();
    let engine = engine.borrow();
    assert!(engine.seeks.is_empty());
    assert!(engine.auto_play);
    assert_eq!(
        engine.parameters.as_value(),
        &json!({"max_bitrate": 800_000})
    );
    assert_eq!(engine.prepared.as_ref().unwrap().len(), 1);

    assert_eq!(controller.state(), SessionState::Initializing);
    assert!(!controller
        .surface()
        .iter()
        .any(|u| matches!(u, SurfaceUpdate::ErrorMessage(_) | SurfaceUpdate::ShowControls)));
}

#[test]
fn drift_event_is_recovered_through_event_delivery() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    controller.handle_engine_event(EngineEvent::Error(EngineError::source_stage(
        BehindLiveWindow,
    )));

    assert_eq!(registry.created(), 2);
    assert_eq!(controller.state(), SessionState::Initializing);
}

#[test]
fn decoder_failure_surfaces_and_stops() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    controller.handle_engine_event(ready());
    registry.latest().borrow_mut().position_ms = 3_000;

    let error = EngineError::renderer(DecoderInitError::missing("video/hevc").secure());
    let action = controller.on_engine_error(&error);

    let message = "This device does not provide a secure decoder for video/hevc".to_string();
    assert_eq!(
        action,
        RecoveryAction::SurfaceToUser {
            message: message.clone()
        }
    );
    assert_eq!(controller.state(), SessionState::Empty);
    assert_eq!(registry.live(), 0);
    assert_eq!(registry.created(), 1);

    let surface = controller.surface();
    assert_eq!(
        &surface[surface.len() - 2..],
        &[
            SurfaceUpdate::ErrorMessage(message),
            SurfaceUpdate::ShowControls
        ]
    );
}

#[test]
fn drift_wrapped_in_renderer_failure_is_not_recovered() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    let error = EngineError::renderer(SourceLoadError::caused_by("wrapped", BehindLiveWindow));
    let action = controller.on_engine_error(&error);

    assert_eq!(
        action,
        RecoveryAction::SurfaceToUser {
            message: "Playback failed".to_string()
        }
    );
    assert_eq!(registry.created(), 1);
}

#[test]
fn retry_after_failure_resumes_where_it_failed() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    {
        let engine = registry.latest();
        let mut engine = engine.borrow_mut();
        engine.window_index = 1;
        engine.position_ms = 7_500;
    }
    controller.on_engine_error(&EngineError::unexpected("decoder thread crashed"));
    assert_eq!(registry.created(), 1);

    controller.retry();

    assert_eq!(registry.created(), 2);
    assert_eq!(registry.latest().borrow().seeks, vec![(1, 7_500)]);
    assert_eq!(controller.state(), SessionState::Initializing);
}

#[test]
fn retry_with_live_engine_reprepares_it() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);

    controller.retry();

    assert_eq!(registry.created(), 1);
    assert_eq!(registry.latest().borrow().retries, 1);
}

// ============================================================================
// Saved state
// ============================================================================

#[test]
fn save_state_captures_without_stopping() {
    let registry = EngineRegistry::new();
    let mut controller = controller(&registry, PlaybackConfig::default());
    controller.start(two_items(), None);
    {
        let engine = registry.latest();
        let mut engine = engine.borrow_mut();
        engine.window_index = 1;
        engine.position_ms = 61_000;
    }

    let state = controller.save_state();

    assert!(controller.is_live());
    assert_eq!(state.get("window"), Some(&json!(1)));
    assert_eq!(state.get("position"), Some(&json!(61_000)));
    assert_eq!(state.get("auto_play"), Some(&json!(true)));
}

#[test]
fn restored_state_is_applied_at_next_start() {
    let registry = EngineRegistry::new();
    let mut first = controller(&registry, PlaybackConfig::default());
    first.start(two_items(), None);
    {
        let engine = registry.latest();
        let mut engine = engine.borrow_mut();
        engine.window_index = 1;
        engine.position_ms = 30_000;
        engine.auto_play = false;
    }
    let state = first.save_state();
    first.stop();

    let mut second = controller(&registry, PlaybackConfig::default());
    second.restore_state(&state);
    second.start(two_items(), Some(second.snapshot().clone()));

    let engine = registry.latest();
    assert_eq!(engine.borrow().seeks, vec![(1, 30_000)]);
    assert!(!engine.borrow().auto_play);
}

#[test]
fn independent_controllers_do_not_share_state() {
    let registry_a = EngineRegistry::new();
    let registry_b = EngineRegistry::new();
    let mut a = controller(&registry_a, PlaybackConfig::default());
    let mut b = controller(&registry_b, PlaybackConfig::default());

    a.start(two_items(), None);
    a.set_playback_rate(1.5).unwrap();
    b.start(two_items(), None);

    assert_eq!(b.playback_rate(), 1.0);
    assert!(registry_b.latest().borrow().rate_changes.is_empty());
    assert_eq!(registry_a.created(), 1);
    assert_eq!(registry_b.created(), 1);
}

#[test]
fn config_controls_auto_play_and_initial_rate() {
    let registry = EngineRegistry::new();
    let config = PlaybackConfig {
        default_auto_play: false,
        initial_rate: 1.5,
        handle_audio_focus: false,
        ..Default::default()
    };
    let mut controller = controller(&registry, config);

    controller.start(two_items(), None);

    let engine = registry.latest();
    let engine = engine.borrow();
    assert!(!engine.auto_play);
    assert_eq!(engine.rate, 1.5);
    assert_eq!(engine.handle_audio_focus, Some(false));
}
