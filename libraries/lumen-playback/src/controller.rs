//! Playback session controller - core orchestration
//!
//! Owns the engine lifecycle for one screen: builds the playlist, creates and
//! releases engine instances, carries selection state across teardown, applies
//! the rate policy and decides how to react to engine failures.

use crate::{
    classifier::{classify, ErrorClass},
    engine::{EngineError, EngineEvent, EngineFactory, EngineState, PlaybackEngine, TrackGroups},
    error::{PlaybackError, Result},
    playlist,
    rate::{format_rate_label, is_valid_rate, next_rate, same_rate},
    selection::{SavedState, SelectionSnapshot, SelectionStore},
    surface::{ControlSurface, SurfaceUpdate},
    types::{PlaybackConfig, SessionState},
};
use lumen_core::MediaItem;
use tracing::{debug, info, warn};

/// What the controller did about an engine failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Engine was recreated at the live edge; nothing was shown to the user
    Reinitialized,

    /// Failure was shown to the user; retry is up to them
    SurfaceToUser { message: String },

    /// No session was live; the failure belongs to a released engine
    Ignored,
}

/// One live engine instance and what is attached to it
struct Session {
    engine: Box<dyn PlaybackEngine>,
    state: SessionState,
    attached: usize,
    last_seen_groups: Option<TrackGroups>,
}

/// Playback session controller
///
/// Holds at most one engine instance at a time. Driven from a single control
/// thread: host lifecycle calls, surface commands and engine events must be
/// delivered one at a time.
pub struct SessionController<F, S> {
    factory: F,
    surface: S,
    config: PlaybackConfig,

    // Current playlist, kept across stop/start
    items: Vec<MediaItem>,

    session: Option<Session>,
    store: SelectionStore,

    // Display preference, survives engine teardown
    rate: f32,
}

impl<F, S> SessionController<F, S>
where
    F: EngineFactory,
    S: ControlSurface,
{
    /// Create a controller with no session and the default snapshot
    pub fn new(config: PlaybackConfig, factory: F, surface: S) -> Self {
        let rate = if is_valid_rate(config.initial_rate) {
            config.initial_rate
        } else {
            warn!(
                rate = config.initial_rate,
                "Initial playback rate is invalid, using 1.0"
            );
            1.0
        };

        let mut store = SelectionStore::new();
        store.save(default_snapshot(&config));

        Self {
            factory,
            surface,
            config,
            items: Vec::new(),
            session: None,
            store,
            rate,
        }
    }

    // ===== Session lifecycle =====

    /// Start a session for `items`
    ///
    /// No-op while a session is live. Otherwise creates a fresh engine,
    /// applies the snapshot's track parameters, rate and auto-play flag, seeks
    /// to the snapshot's start position if it has one, and attaches the
    /// playlist. Without a snapshot the engine defaults are used.
    pub fn start(&mut self, items: Vec<MediaItem>, restored: Option<SelectionSnapshot>) {
        if let Some(session) = &self.session {
            debug!(state = ?session.state, "Session already live, ignoring start");
            return;
        }

        self.items = items;
        let entries = playlist::build(&self.items);
        let snapshot = restored.unwrap_or_else(|| default_snapshot(&self.config));

        let mut engine = self.factory.create();
        engine.set_handle_audio_focus(self.config.handle_audio_focus);
        engine.set_track_parameters(snapshot.track_parameters.clone());
        if !same_rate(engine.playback_rate(), self.rate) {
            engine.set_playback_rate(self.rate);
        }
        engine.set_auto_play(snapshot.auto_play);

        if let Some(start) = snapshot.start_position {
            engine.seek_to(start.window_index, start.position_ms);
        }

        let attached = entries.len();
        engine.prepare(entries);

        info!(
            items = self.items.len(),
            attached,
            auto_play = snapshot.auto_play,
            resume = ?snapshot.start_position,
            "Playback session started"
        );

        self.store.save(snapshot);
        self.session = Some(Session {
            engine,
            state: SessionState::Initializing,
            attached,
            last_seen_groups: None,
        });

        self.surface
            .apply(SurfaceUpdate::RateLabel(format_rate_label(self.rate)));
        if attached == 0 {
            self.surface.apply(SurfaceUpdate::NothingToPlay);
            self.surface.apply(SurfaceUpdate::ShowControls);
        }
    }

    /// Start again with the current playlist and stored snapshot
    pub fn resume(&mut self) {
        let snapshot = self.store.snapshot().clone();
        self.start(self.items.clone(), Some(snapshot));
    }

    /// Capture the session into a snapshot and release the engine
    ///
    /// Safe without a live session: returns the last captured snapshot, or the
    /// default one if nothing was ever captured.
    pub fn stop(&mut self) -> SelectionSnapshot {
        if let Some(mut session) = self.session.take() {
            let snapshot = SelectionSnapshot::capture(session.engine.as_ref());
            session.engine.release();

            debug!(resume = ?snapshot.start_position, "Playback session stopped");
            self.store.save(snapshot);
        }

        self.store.snapshot().clone()
    }

    /// Replace the playlist for a new playback intent
    ///
    /// Any live session is stopped and its position discarded; track
    /// parameters are kept.
    pub fn replace_items(&mut self, items: Vec<MediaItem>) {
        self.stop();
        self.store.clear_start_position();
        self.items = items;
    }

    /// Retry playback after a failure was shown
    ///
    /// A live engine is asked to re-prepare; otherwise a new session is
    /// started from the current playlist and stored snapshot.
    pub fn retry(&mut self) {
        match self.session.as_mut() {
            Some(session) => {
                debug!("Retrying playback on live engine");
                session.engine.retry();
            }
            None => self.resume(),
        }
    }

    // ===== Saved state =====

    /// Encode the selection state for the host's saved-state bundle
    ///
    /// A live engine's state is captured first; the engine keeps running.
    pub fn save_state(&mut self) -> SavedState {
        if let Some(session) = &self.session {
            self.store
                .save(SelectionSnapshot::capture(session.engine.as_ref()));
        }

        self.store.to_saved_state()
    }

    /// Restore selection state saved by `save_state`, applied at the next start
    pub fn restore_state(&mut self, state: &SavedState) {
        self.store.restore(state);
    }

    /// Return the stored selection state to its defaults
    pub fn reset_state(&mut self) {
        self.store.save(default_snapshot(&self.config));
    }

    // ===== Rate =====

    /// Set the playback rate
    ///
    /// Rates outside [0.5, 2.0] are rejected and the current rate is kept.
    /// With a live engine the rate is applied only if it differs from the
    /// engine's; without one it is remembered for the next start.
    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        if !is_valid_rate(rate) {
            warn!(rate, "Playback rate is invalid");
            return Err(PlaybackError::InvalidRate(rate));
        }

        match self.session.as_mut() {
            Some(session) => {
                if same_rate(session.engine.playback_rate(), rate) {
                    debug!(rate, "Playback rate is not changed");
                } else {
                    session.engine.set_playback_rate(rate);
                }
            }
            None => debug!(rate, "No live engine, rate applies at next start"),
        }
        self.rate = rate;

        self.surface
            .apply(SurfaceUpdate::RateLabel(format_rate_label(rate)));
        Ok(())
    }

    /// Advance to the next rate on the 0.8 / 1.0 / 1.5 ladder
    pub fn cycle_rate(&mut self) -> f32 {
        let rate = next_rate(self.rate);
        if let Err(e) = self.set_playback_rate(rate) {
            warn!("Rate ladder produced an invalid rate: {}", e);
        }
        rate
    }

    // ===== Engine events =====

    /// Handle one engine notification
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::StateChanged { auto_play, state } => {
                self.on_engine_state_changed(auto_play, state);
            }
            EngineEvent::TracksChanged {
                groups,
                current_tag,
            } => self.on_track_groups_changed(groups, current_tag),
            EngineEvent::Error(error) => {
                self.on_engine_error(&error);
            }
            EngineEvent::ControllerVisibility(visible) => {
                self.surface
                    .apply(SurfaceUpdate::ControlsVisibility(visible));
            }
        }
    }

    fn on_engine_state_changed(&mut self, auto_play: bool, state: EngineState) {
        let Some(session) = self.session.as_mut() else {
            debug!(?state, "State change without a live session, ignoring");
            return;
        };

        match state {
            EngineState::Ready if session.state == SessionState::Initializing => {
                session.state = SessionState::Active;
                info!(auto_play, "Playback session active");
            }
            EngineState::Ended => self.surface.apply(SurfaceUpdate::ShowControls),
            _ => debug!(?state, auto_play, "Engine state changed"),
        }
    }

    /// React to an engine failure
    ///
    /// Live-window drift restarts the engine at the live edge without the
    /// user noticing. Anything else stops the session and shows the mapped
    /// message with persistent controls. Failures arriving when no session
    /// is live are ignored.
    pub fn on_engine_error(&mut self, error: &EngineError) -> RecoveryAction {
        if self.session.is_none() {
            debug!(%error, "Engine error without a live session, ignoring");
            return RecoveryAction::Ignored;
        }

        match classify(error) {
            ErrorClass::RecoverableLiveWindowDrift => {
                info!(%error, "Playback fell behind the live window, restarting at the live edge");

                if let Some(mut session) = self.session.take() {
                    session.engine.release();
                }
                self.store.clear_start_position();
                self.resume();

                RecoveryAction::Reinitialized
            }
            ErrorClass::SurfaceToUser(reason) => {
                let message = reason.to_string();
                warn!(%error, %message, "Playback failed");

                self.stop();
                self.surface
                    .apply(SurfaceUpdate::ErrorMessage(message.clone()));
                self.surface.apply(SurfaceUpdate::ShowControls);

                RecoveryAction::SurfaceToUser { message }
            }
        }
    }

    /// React to a change of the available tracks
    ///
    /// Repeats of the last-seen group set are ignored. A genuine change shows
    /// the title of the item at playlist position `current_tag`.
    pub fn on_track_groups_changed(&mut self, groups: TrackGroups, current_tag: Option<usize>) {
        let Some(session) = self.session.as_mut() else {
            debug!("Track change without a live session, ignoring");
            return;
        };

        if session.last_seen_groups.as_ref() == Some(&groups) {
            debug!("Track groups unchanged");
            return;
        }
        session.last_seen_groups = Some(groups);

        match current_tag.and_then(|tag| self.items.get(tag)) {
            Some(item) => self.surface.apply(SurfaceUpdate::Title {
                text: item.title().to_string(),
                visible: item.shows_title_overlay(),
            }),
            None => warn!(?current_tag, "Track change for unknown playlist position"),
        }
    }

    // ===== Accessors =====

    /// Session state
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Empty, |s| s.state)
    }

    /// Whether an engine instance is live
    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    /// Remembered playback rate
    pub fn playback_rate(&self) -> f32 {
        self.rate
    }

    /// Stored selection snapshot (as of the last start, stop or save)
    pub fn snapshot(&self) -> &SelectionSnapshot {
        self.store.snapshot()
    }

    /// Current playlist items
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Number of entries attached to the live engine
    pub fn attached_len(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.attached)
    }

    /// Controller configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Control surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Control surface (mutable)
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn default_snapshot(config: &PlaybackConfig) -> SelectionSnapshot {
    SelectionSnapshot {
        auto_play: config.default_auto_play,
        ..SelectionSnapshot::default()
    }
}
