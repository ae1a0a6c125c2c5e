//! Core types for playback session control

use crate::error::{PlaybackError, Result};
use crate::rate::{is_valid_rate, MAX_RATE, MIN_RATE};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the controller's session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No engine instance is live
    Empty,

    /// Engine created and playlist attached, waiting for readiness
    Initializing,

    /// Engine confirmed it is ready
    Active,
}

/// Which host callbacks create and release the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleMode {
    /// Engine lives while the screen is visible (start/stop).
    /// Required for multi-window hosts where a visible screen may be paused.
    Visible,

    /// Engine lives while the screen is in the foreground (resume/pause)
    Foreground,
}

/// Screen orientation, driven by the fullscreen toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Portrait (windowed)
    Portrait,

    /// Landscape (fullscreen)
    Landscape,
}

impl Orientation {
    /// The other orientation
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }

    /// Whether this orientation counts as fullscreen
    pub fn is_fullscreen(self) -> bool {
        self == Orientation::Landscape
    }
}

/// What the host should do after a back press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Keep playing in a picture-in-picture window
    EnterPictureInPicture,

    /// Close the screen
    Finish,
}

/// Configuration for the session controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Playback rate applied to the first engine (default: 1.0)
    pub initial_rate: f32,

    /// Auto-play flag used when no snapshot says otherwise (default: true)
    pub default_auto_play: bool,

    /// Let the engine manage audio focus (default: true)
    pub handle_audio_focus: bool,

    /// Host supports picture-in-picture (default: true)
    pub picture_in_picture: bool,

    /// Host callbacks that bound the engine lifetime (default: Visible)
    pub lifecycle: LifecycleMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_rate: 1.0,
            default_auto_play: true,
            handle_audio_focus: true,
            picture_in_picture: true,
            lifecycle: LifecycleMode::Visible,
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !is_valid_rate(self.initial_rate) {
            return Err(PlaybackError::InvalidConfig(format!(
                "initial_rate {} is outside [{}, {}]",
                self.initial_rate, MIN_RATE, MAX_RATE
            )));
        }

        Ok(())
    }
}
