//! Lumen - Playback Session Control
//!
//! Platform-agnostic control of one full-screen playback session.
//!
//! This crate provides:
//! - Playlist building (content kind inference, input-index tagging)
//! - Selection state that survives engine teardown and host recreation
//! - Engine error classification (live-window drift vs. user-facing failures)
//! - Playback rate policy (bounds, 0.8 / 1.0 / 1.5 toggle ladder)
//! - The session controller that owns the engine lifecycle
//! - A host lifecycle driver (start/stop, saved state, picture-in-picture)
//!
//! # Architecture
//!
//! `lumen-playback` does not decode, buffer or render anything:
//! - The streaming engine is reached through `PlaybackEngine` / `EngineFactory`
//! - On-screen controls are reached through `ControlSurface`
//! - Host callbacks are serialized onto one control thread by the host
//!
//! # Example
//!
//! ```rust
//! use lumen_core::MediaItem;
//! use lumen_playback::{
//!     PlaybackConfig, PlaybackEngine, PlaylistEntry, SessionController, SessionState,
//!     SurfaceUpdate, TrackParameters,
//! };
//!
//! // Engine wrapper for your platform
//! struct MyEngine {
//!     rate: f32,
//! }
//!
//! impl PlaybackEngine for MyEngine {
//!     fn set_track_parameters(&mut self, _parameters: TrackParameters) {}
//!     fn track_parameters(&self) -> TrackParameters {
//!         TrackParameters::default()
//!     }
//!     fn set_handle_audio_focus(&mut self, _handle: bool) {}
//!     fn set_auto_play(&mut self, _auto_play: bool) {}
//!     fn auto_play(&self) -> bool {
//!         true
//!     }
//!     fn playback_rate(&self) -> f32 {
//!         self.rate
//!     }
//!     fn set_playback_rate(&mut self, rate: f32) {
//!         self.rate = rate;
//!     }
//!     fn seek_to(&mut self, _window_index: usize, _position_ms: u64) {}
//!     fn prepare(&mut self, _entries: Vec<PlaylistEntry>) {}
//!     fn current_window_index(&self) -> usize {
//!         0
//!     }
//!     fn content_position_ms(&self) -> i64 {
//!         0
//!     }
//!     fn retry(&mut self) {}
//!     fn release(&mut self) {}
//! }
//!
//! let factory = || Box::new(MyEngine { rate: 1.0 }) as Box<dyn PlaybackEngine>;
//! let surface: Vec<SurfaceUpdate> = Vec::new();
//! let mut controller = SessionController::new(PlaybackConfig::default(), factory, surface);
//!
//! controller.start(vec![MediaItem::new("https://cdn.example.com/live.m3u8", "Live")], None);
//! assert_eq!(controller.state(), SessionState::Initializing);
//!
//! assert_eq!(controller.cycle_rate(), 1.5);
//!
//! let snapshot = controller.stop();
//! assert_eq!(controller.state(), SessionState::Empty);
//! assert!(snapshot.start_position.is_some());
//! ```

mod classifier;
mod controller;
mod engine;
mod error;
mod host;
mod intent;
pub mod playlist;
pub mod rate;
mod selection;
mod surface;
pub mod types;

// Public exports
pub use classifier::{classify, failure_reason, is_behind_live_window, ErrorClass, FailureReason};
pub use controller::{RecoveryAction, SessionController};
pub use engine::{
    BehindLiveWindow, BoxError, DecoderInitError, DecoderQueryError, EngineError, EngineEvent,
    EngineFactory, EngineState, ErrorStage, PlaybackEngine, SourceLoadError, TrackGroup,
    TrackGroups, TrackKind, TrackParameters,
};
pub use error::{PlaybackError, Result};
pub use host::{ScreenHost, PERMISSION_DENIED_NOTICE};
pub use intent::items_from_payload;
pub use playlist::{ContentKind, PlaylistEntry};
pub use selection::{
    SavedState, SelectionSnapshot, SelectionStore, StartPosition, INDEX_UNSET, KEY_AUTO_PLAY,
    KEY_POSITION, KEY_TRACK_SELECTOR_PARAMETERS, KEY_WINDOW, TIME_UNSET,
};
pub use surface::{ControlSurface, SurfaceCommand, SurfaceUpdate};
pub use types::{BackAction, LifecycleMode, Orientation, PlaybackConfig, SessionState};
