//! Control surface boundary
//!
//! The on-screen controls are rendered by the host. The controller pushes
//! `SurfaceUpdate`s to them and receives `SurfaceCommand`s back.

use crate::types::Orientation;

/// Display update pushed to the control surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceUpdate {
    /// Title of the item now playing and whether the overlay is shown
    Title { text: String, visible: bool },

    /// Rate button label, e.g. `x1.5`
    RateLabel(String),

    /// Fatal playback error, shown verbatim
    ErrorMessage(String),

    /// Show the persistent controls
    ShowControls,

    /// Engine controls were shown or hidden
    ControlsVisibility(bool),

    /// The playlist has nothing playable
    NothingToPlay,

    /// Fullscreen affordance for the current orientation
    Fullscreen(Orientation),

    /// Enable or disable the on-screen controller (disabled in picture-in-picture)
    ControllerEnabled(bool),

    /// Transient notice (e.g. a permission denial)
    Notice(String),
}

/// Command sent by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCommand {
    /// Advance the playback rate ladder
    ToggleRate,

    /// Flip between portrait and landscape
    ToggleFullscreen,

    /// Close the screen
    Close,

    /// Retry after a failure was shown
    RetryPlayback,
}

/// Receiver of display updates
#[cfg_attr(test, mockall::automock)]
pub trait ControlSurface {
    /// Apply one update
    fn apply(&mut self, update: SurfaceUpdate);
}

impl ControlSurface for Vec<SurfaceUpdate> {
    fn apply(&mut self, update: SurfaceUpdate) {
        self.push(update);
    }
}
