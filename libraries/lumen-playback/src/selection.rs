//! Selection state store
//!
//! Keeps what is needed to resume playback at the same place with the same
//! track choice after the controller's engine has been torn down, and maps it
//! to and from the host's key/value saved-state bundle.

use crate::engine::{PlaybackEngine, TrackParameters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Saved-state key for the track selection parameters
pub const KEY_TRACK_SELECTOR_PARAMETERS: &str = "track_selector_parameters";

/// Saved-state key for the auto-play flag
pub const KEY_AUTO_PLAY: &str = "auto_play";

/// Saved-state key for the playlist window index
pub const KEY_WINDOW: &str = "window";

/// Saved-state key for the position inside the window
pub const KEY_POSITION: &str = "position";

/// Persisted value of an unset window index
pub const INDEX_UNSET: i64 = -1;

/// Persisted value of an unset position
pub const TIME_UNSET: i64 = i64::MIN + 1;

/// Where the next engine should start playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    /// Playlist window index
    pub window_index: usize,

    /// Offset inside the window
    pub position_ms: u64,
}

/// Track choice and position captured from an engine
///
/// Window and position are a single optional value, so they are always set
/// and cleared together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    /// Engine track selection parameters
    pub track_parameters: TrackParameters,

    /// Start playing as soon as ready
    pub auto_play: bool,

    /// Resume point, or `None` to start at the default position
    pub start_position: Option<StartPosition>,
}

impl Default for SelectionSnapshot {
    fn default() -> Self {
        Self {
            track_parameters: TrackParameters::default(),
            auto_play: true,
            start_position: None,
        }
    }
}

impl SelectionSnapshot {
    /// Capture the state of a live engine
    ///
    /// A negative position (seen transiently while an engine tears down) is
    /// recorded as zero.
    pub fn capture(engine: &dyn PlaybackEngine) -> Self {
        Self {
            track_parameters: engine.track_parameters(),
            auto_play: engine.auto_play(),
            start_position: Some(StartPosition {
                window_index: engine.current_window_index(),
                position_ms: engine.content_position_ms().max(0).unsigned_abs(),
            }),
        }
    }

    /// Same snapshot without a start position
    #[must_use]
    pub fn without_start_position(mut self) -> Self {
        self.start_position = None;
        self
    }
}

/// Opaque key/value bundle the host persists across recreation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedState(BTreeMap<String, serde_json::Value>);

impl SavedState {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Store `value` under `key`
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    /// Keys in the bundle
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether the bundle is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Holder of the current selection snapshot
///
/// Each save fully replaces the previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    snapshot: SelectionSnapshot,
}

impl SelectionStore {
    /// Create a store holding the default snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }

    /// Replace the snapshot
    pub fn save(&mut self, snapshot: SelectionSnapshot) {
        self.snapshot = snapshot;
    }

    /// Forget the resume point and reset auto-play, keeping track parameters
    pub fn clear_start_position(&mut self) {
        self.snapshot.auto_play = true;
        self.snapshot.start_position = None;
    }

    /// Encode the snapshot under the four saved-state keys
    pub fn to_saved_state(&self) -> SavedState {
        let (window, position) = match self.snapshot.start_position {
            Some(start) => (
                i64::try_from(start.window_index).unwrap_or(i64::MAX),
                i64::try_from(start.position_ms).unwrap_or(i64::MAX),
            ),
            None => (INDEX_UNSET, TIME_UNSET),
        };

        let mut state = SavedState::new();
        state.insert(
            KEY_TRACK_SELECTOR_PARAMETERS,
            self.snapshot.track_parameters.as_value().clone(),
        );
        state.insert(KEY_AUTO_PLAY, serde_json::Value::Bool(self.snapshot.auto_play));
        state.insert(KEY_WINDOW, serde_json::Value::from(window));
        state.insert(KEY_POSITION, serde_json::Value::from(position));
        state
    }

    /// Replace the snapshot with one decoded from a saved-state bundle
    ///
    /// Missing keys fall back to defaults. The start position is restored only
    /// when both window and position are set.
    pub fn restore(&mut self, state: &SavedState) {
        let track_parameters = state
            .get(KEY_TRACK_SELECTOR_PARAMETERS)
            .cloned()
            .map(TrackParameters::from_value)
            .unwrap_or_default();

        let auto_play = state
            .get(KEY_AUTO_PLAY)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);

        let window = state
            .get(KEY_WINDOW)
            .and_then(serde_json::Value::as_i64)
            .and_then(|w| usize::try_from(w).ok());

        let position = state
            .get(KEY_POSITION)
            .and_then(serde_json::Value::as_i64)
            .filter(|p| *p != TIME_UNSET)
            .map(|p| p.max(0).unsigned_abs());

        let start_position = match (window, position) {
            (Some(window_index), Some(position_ms)) => Some(StartPosition {
                window_index,
                position_ms,
            }),
            _ => None,
        };

        self.snapshot = SelectionSnapshot {
            track_parameters,
            auto_play,
            start_position,
        };
    }
}
