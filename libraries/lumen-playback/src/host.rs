//! Host lifecycle driver
//!
//! Translates the host screen's lifecycle callbacks, picture-in-picture
//! transitions and control-surface commands into controller calls. The host
//! guarantees the callbacks arrive one at a time on the control thread.

use crate::{
    controller::{RecoveryAction, SessionController},
    engine::{EngineEvent, EngineFactory},
    error::{PlaybackError, Result},
    intent::items_from_payload,
    selection::SavedState,
    surface::{ControlSurface, SurfaceCommand, SurfaceUpdate},
    types::{BackAction, LifecycleMode, Orientation},
};
use tracing::{debug, info, warn};

/// Message shown when the host refuses the storage permission
pub const PERMISSION_DENIED_NOTICE: &str = "Permission to access storage was denied";

/// One playback screen
pub struct ScreenHost<F, S> {
    controller: SessionController<F, S>,
    orientation: Orientation,
    in_picture_in_picture: bool,
    finished: bool,
    // A failure was shown; only the user restarts playback
    failed: bool,
}

impl<F, S> ScreenHost<F, S>
where
    F: EngineFactory,
    S: ControlSurface,
{
    /// Wrap a controller
    pub fn new(controller: SessionController<F, S>) -> Self {
        Self {
            controller,
            orientation: Orientation::Portrait,
            in_picture_in_picture: false,
            finished: false,
            failed: false,
        }
    }

    // ===== Lifecycle =====

    /// Screen created with its intent payload and, after a recreation, the
    /// state saved by the previous instance
    pub fn on_create(&mut self, payload: Option<&str>, saved: Option<&SavedState>) {
        self.failed = false;
        self.controller.replace_items(items_from_payload(payload));

        match saved {
            Some(state) => {
                debug!("Restoring saved selection state");
                self.controller.restore_state(state);
            }
            None => self.controller.reset_state(),
        }
    }

    /// A new playback intent replaced the current one
    pub fn on_new_intent(&mut self, payload: Option<&str>) {
        info!("New playback intent");
        self.failed = false;
        self.controller.replace_items(items_from_payload(payload));
    }

    /// Screen became visible
    pub fn on_start(&mut self) {
        if self.mode() == LifecycleMode::Visible {
            self.resume_unless_failed();
        }
    }

    /// Screen came to the foreground
    pub fn on_resume(&mut self) {
        if self.mode() == LifecycleMode::Foreground || !self.controller.is_live() {
            self.resume_unless_failed();
        }
    }

    fn resume_unless_failed(&mut self) {
        if self.failed {
            debug!("Playback failed earlier, waiting for the user to retry");
            return;
        }
        self.controller.resume();
    }

    /// Screen left the foreground
    pub fn on_pause(&mut self) {
        if self.mode() == LifecycleMode::Foreground {
            self.controller.stop();
        }
    }

    /// Screen is no longer visible
    pub fn on_stop(&mut self) {
        if self.mode() == LifecycleMode::Visible {
            self.controller.stop();
        }
    }

    /// Screen is being destroyed
    pub fn on_destroy(&mut self) {
        self.controller.stop();
        self.finished = true;
    }

    /// Host is about to discard the screen and wants its state
    pub fn on_save_instance_state(&mut self) -> SavedState {
        self.controller.save_state()
    }

    /// Result of the storage permission prompt
    ///
    /// A denial ends the screen; it is never retried.
    pub fn on_permission_result(&mut self, granted: bool) -> Result<()> {
        if granted {
            self.controller.resume();
            return Ok(());
        }

        warn!("Storage permission denied, closing screen");
        self.controller
            .surface_mut()
            .apply(SurfaceUpdate::Notice(PERMISSION_DENIED_NOTICE.to_string()));
        self.controller.stop();
        self.finished = true;
        Err(PlaybackError::PermissionDenied)
    }

    /// Orientation changed (rotation or fullscreen toggle)
    pub fn on_configuration_changed(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.controller
            .surface_mut()
            .apply(SurfaceUpdate::Fullscreen(orientation));
    }

    // ===== Picture-in-picture =====

    /// Back was pressed
    pub fn on_back_pressed(&mut self) -> BackAction {
        if self.enter_picture_in_picture() {
            BackAction::EnterPictureInPicture
        } else {
            self.finished = true;
            BackAction::Finish
        }
    }

    /// User is leaving the screen (home button, app switch)
    pub fn on_user_leave_hint(&mut self) {
        self.enter_picture_in_picture();
    }

    /// Picture-in-picture mode was entered or left
    pub fn on_picture_in_picture_changed(&mut self, in_picture_in_picture: bool) {
        self.in_picture_in_picture = in_picture_in_picture;
        if !in_picture_in_picture {
            self.controller
                .surface_mut()
                .apply(SurfaceUpdate::ControllerEnabled(true));
        }
    }

    fn enter_picture_in_picture(&mut self) -> bool {
        if !self.controller.config().picture_in_picture {
            return false;
        }

        debug!("Entering picture-in-picture");
        self.controller
            .surface_mut()
            .apply(SurfaceUpdate::ControllerEnabled(false));
        true
    }

    // ===== Commands and events =====

    /// Handle a command from the control surface
    pub fn handle_command(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::ToggleRate => {
                self.controller.cycle_rate();
            }
            SurfaceCommand::ToggleFullscreen => {
                let orientation = self.orientation.toggled();
                self.on_configuration_changed(orientation);
            }
            SurfaceCommand::Close => {
                self.controller.stop();
                self.finished = true;
            }
            SurfaceCommand::RetryPlayback => {
                self.failed = false;
                self.controller.retry();
            }
        }
    }

    /// Forward an engine notification to the controller
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Error(error) => {
                let action = self.controller.on_engine_error(&error);
                if matches!(action, RecoveryAction::SurfaceToUser { .. }) {
                    self.failed = true;
                }
            }
            other => self.controller.handle_engine_event(other),
        }
    }

    // ===== Accessors =====

    fn mode(&self) -> LifecycleMode {
        self.controller.config().lifecycle
    }

    /// The controller
    pub fn controller(&self) -> &SessionController<F, S> {
        &self.controller
    }

    /// The controller (mutable)
    pub fn controller_mut(&mut self) -> &mut SessionController<F, S> {
        &mut self.controller
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether the screen is in picture-in-picture mode
    pub fn is_in_picture_in_picture(&self) -> bool {
        self.in_picture_in_picture
    }

    /// Whether the screen has been closed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether a failure was shown and playback awaits a user retry
    pub fn has_failed(&self) -> bool {
        self.failed
    }
}
