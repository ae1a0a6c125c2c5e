/// Scripted playback session on the simulated engine
use crate::{
    config::CliConfig,
    error::Result,
    simulated::{pending_events, LoggingSurface, SimulatedClock, SimulatedEngineFactory, TaggedEvent},
};
use lumen_playback::{
    ScreenHost, SessionController, SessionState, StartPosition, SurfaceCommand, SurfaceUpdate,
};
use std::sync::mpsc::{self, Receiver};
use tracing::info;

/// Playback time that passes between scripted steps
const STEP_MS: u64 = 5_000;

type SimulatedHost = ScreenHost<SimulatedEngineFactory, LoggingSurface>;

/// What happened during a scripted session
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Engines created across both screen instances
    pub engines_created: u64,

    /// Every surface update, first screen then recreated screen
    pub updates: Vec<SurfaceUpdate>,

    /// Position handed from the first screen to the recreated one
    pub handed_over: Option<StartPosition>,

    /// Rate of the first screen when it was torn down
    pub rate_before_recreation: f32,

    /// Whether the first screen had to retry after a failure
    pub retried: bool,
}

impl SessionReport {
    /// Error messages shown to the user
    pub fn errors_shown(&self) -> Vec<&str> {
        self.updates
            .iter()
            .filter_map(|u| match u {
                SurfaceUpdate::ErrorMessage(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Run a session for the intent `payload`
///
/// Opens a screen, lets it play, cycles the rate, retries once if playback
/// failed, saves state, recreates the screen from that state and closes it.
pub fn run_session(payload: &str, config: &CliConfig) -> Result<SessionReport> {
    config.validate()?;

    let (tx, rx) = mpsc::channel();
    let clock = SimulatedClock::new();
    let factory = SimulatedEngineFactory::new(&config.simulation, clock.clone(), tx);

    // First screen instance
    let mut host = open_screen(config, &factory, payload, None);
    pump(&mut host, &rx, &factory);

    clock.advance(STEP_MS);
    host.handle_command(SurfaceCommand::ToggleRate);
    clock.advance(STEP_MS);
    pump(&mut host, &rx, &factory);

    let retried = !host.controller().is_live();
    if retried {
        info!("Playback stopped after a failure, retrying");
        host.handle_command(SurfaceCommand::RetryPlayback);
        pump(&mut host, &rx, &factory);
        clock.advance(STEP_MS);
    }

    let saved = host.on_save_instance_state();
    let rate_before_recreation = host.controller().playback_rate();
    host.on_pause();
    host.on_stop();
    host.on_destroy();
    let handed_over = host.controller().snapshot().start_position;
    let mut updates = host.controller().surface().updates().to_vec();

    // Recreated screen instance
    info!(resume = ?handed_over, "Recreating screen from saved state");
    let mut host = open_screen(config, &factory, payload, Some(&saved));
    pump(&mut host, &rx, &factory);
    clock.advance(STEP_MS);
    host.handle_command(SurfaceCommand::Close);
    updates.extend_from_slice(host.controller().surface().updates());

    let report = SessionReport {
        engines_created: factory.current_generation(),
        updates,
        handed_over,
        rate_before_recreation,
        retried,
    };
    info!(
        engines = report.engines_created,
        updates = report.updates.len(),
        errors = report.errors_shown().len(),
        "Session finished"
    );
    Ok(report)
}

fn open_screen(
    config: &CliConfig,
    factory: &SimulatedEngineFactory,
    payload: &str,
    saved: Option<&lumen_playback::SavedState>,
) -> SimulatedHost {
    let controller = SessionController::new(
        config.playback.clone(),
        factory.clone(),
        LoggingSurface::new(),
    );
    let mut host = ScreenHost::new(controller);
    host.on_create(Some(payload), saved);
    host.on_start();
    host.on_resume();
    host
}

// Deliver notifications until the engines go quiet
fn pump(host: &mut SimulatedHost, events: &Receiver<TaggedEvent>, factory: &SimulatedEngineFactory) {
    loop {
        let pending = pending_events(events, factory);
        if pending.is_empty() {
            break;
        }
        for event in pending {
            host.handle_engine_event(event);
        }
    }

    if host.controller().state() == SessionState::Active {
        info!("Playback active");
    }
}
