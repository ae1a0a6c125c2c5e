//! Simulated streaming engine and a logging control surface
//!
//! The simulated engine never decodes anything. It reports a plausible
//! sequence of notifications for whatever is attached to it, and can be told
//! to fail the way real streams do.

use crate::config::SimulationSettings;
use lumen_playback::{
    BehindLiveWindow, ContentKind, ControlSurface, DecoderInitError, EngineError, EngineEvent,
    EngineFactory, EngineState, PlaybackEngine, PlaylistEntry, SourceLoadError, SurfaceUpdate,
    TrackGroup, TrackGroups, TrackKind, TrackParameters,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};
use tracing::{debug, info};

/// Event tagged with the generation of the engine that sent it
pub type TaggedEvent = (u64, EngineEvent);

/// Failure an engine reports once it is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    LiveWindowDrift,
    MissingDecoder,
}

impl Fault {
    fn to_error(self) -> EngineError {
        match self {
            Fault::LiveWindowDrift => EngineError::source_stage(SourceLoadError::caused_by(
                "media playlist refresh",
                BehindLiveWindow,
            )),
            Fault::MissingDecoder => {
                EngineError::renderer(DecoderInitError::missing("video/hevc"))
            }
        }
    }
}

/// Playback clock shared by the host and its engines
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    now_ms: Rc<Cell<u64>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `ms` milliseconds of playback pass
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Engine that replays a scripted notification sequence
pub struct SimulatedEngine {
    generation: u64,
    events: Sender<TaggedEvent>,
    clock: SimulatedClock,
    buffering_ticks: u32,
    fault: Option<Fault>,

    parameters: TrackParameters,
    auto_play: bool,
    rate: f32,
    entries: Vec<PlaylistEntry>,
    window_index: usize,
    // Position at `anchor_ms` on the clock
    position_ms: u64,
    anchor_ms: u64,
    released: bool,
}

impl SimulatedEngine {
    fn send(&self, event: EngineEvent) {
        if self.released {
            return;
        }
        if self.events.send((self.generation, event)).is_err() {
            debug!(generation = self.generation, "Event receiver dropped");
        }
    }

    // Fold the playback since the anchor into the stored position
    fn rebase(&mut self) {
        let now = self.clock.now_ms();
        if self.auto_play {
            let played = (now.saturating_sub(self.anchor_ms) as f64 * f64::from(self.rate)) as u64;
            self.position_ms = self.position_ms.saturating_add(played);
        }
        self.anchor_ms = now;
    }

    fn track_groups(entry: &PlaylistEntry) -> TrackGroups {
        let mut groups = vec![TrackGroup::new(TrackKind::Audio, [entry.source.as_str()])];
        if entry.content_kind == ContentKind::Adaptive {
            groups.push(TrackGroup::new(TrackKind::Video, [entry.source.as_str()]));
        }
        TrackGroups::new(groups)
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn set_track_parameters(&mut self, parameters: TrackParameters) {
        self.parameters = parameters;
    }

    fn track_parameters(&self) -> TrackParameters {
        self.parameters.clone()
    }

    fn set_handle_audio_focus(&mut self, handle: bool) {
        debug!(generation = self.generation, handle, "Audio focus handling");
    }

    fn set_auto_play(&mut self, auto_play: bool) {
        self.rebase();
        self.auto_play = auto_play;
    }

    fn auto_play(&self) -> bool {
        self.auto_play
    }

    fn playback_rate(&self) -> f32 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.rebase();
        self.rate = rate;
    }

    fn seek_to(&mut self, window_index: usize, position_ms: u64) {
        self.window_index = window_index;
        self.position_ms = position_ms;
        self.anchor_ms = self.clock.now_ms();
    }

    fn prepare(&mut self, entries: Vec<PlaylistEntry>) {
        self.entries = entries;
        self.anchor_ms = self.clock.now_ms();

        for _ in 0..self.buffering_ticks {
            self.send(EngineEvent::StateChanged {
                auto_play: self.auto_play,
                state: EngineState::Buffering,
            });
        }

        let Some(entry) = self.entries.get(self.window_index) else {
            self.send(EngineEvent::StateChanged {
                auto_play: self.auto_play,
                state: EngineState::Ended,
            });
            return;
        };

        let groups = Self::track_groups(entry);
        let tag = entry.index;
        self.send(EngineEvent::StateChanged {
            auto_play: self.auto_play,
            state: EngineState::Ready,
        });
        self.send(EngineEvent::TracksChanged {
            groups,
            current_tag: Some(tag),
        });
        self.send(EngineEvent::ControllerVisibility(true));

        if let Some(fault) = self.fault.take() {
            self.send(EngineEvent::Error(fault.to_error()));
        }
    }

    fn current_window_index(&self) -> usize {
        self.window_index
    }

    fn content_position_ms(&self) -> i64 {
        if !self.auto_play {
            return i64::try_from(self.position_ms).unwrap_or(i64::MAX);
        }

        let elapsed = self.clock.now_ms().saturating_sub(self.anchor_ms);
        let played = (elapsed as f64 * f64::from(self.rate)) as u64;
        i64::try_from(self.position_ms.saturating_add(played)).unwrap_or(i64::MAX)
    }

    fn retry(&mut self) {
        info!(generation = self.generation, "Engine re-preparing");
        let entries = std::mem::take(&mut self.entries);
        self.prepare(entries);
    }

    fn release(&mut self) {
        self.released = true;
        debug!(generation = self.generation, "Engine released");
    }
}

/// Creates simulated engines and remembers which one is current
#[derive(Clone)]
pub struct SimulatedEngineFactory {
    events: Sender<TaggedEvent>,
    clock: SimulatedClock,
    buffering_ticks: u32,
    faults: Rc<RefCell<VecDeque<Fault>>>,
    generation: Rc<Cell<u64>>,
}

impl SimulatedEngineFactory {
    /// Factory sending notifications to `events`
    ///
    /// Injected faults are handed out one per engine, drift first.
    pub fn new(
        settings: &SimulationSettings,
        clock: SimulatedClock,
        events: Sender<TaggedEvent>,
    ) -> Self {
        let mut faults = VecDeque::new();
        if settings.inject_live_window_drift {
            faults.push_back(Fault::LiveWindowDrift);
        }
        if settings.inject_decoder_failure {
            faults.push_back(Fault::MissingDecoder);
        }

        Self {
            events,
            clock,
            buffering_ticks: settings.buffering_ticks,
            faults: Rc::new(RefCell::new(faults)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Generation of the most recently created engine (0 before the first)
    pub fn current_generation(&self) -> u64 {
        self.generation.get()
    }
}

impl EngineFactory for SimulatedEngineFactory {
    fn create(&mut self) -> Box<dyn PlaybackEngine> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let fault = self.faults.borrow_mut().pop_front();

        debug!(generation, ?fault, "Creating simulated engine");
        Box::new(SimulatedEngine {
            generation,
            events: self.events.clone(),
            clock: self.clock.clone(),
            buffering_ticks: self.buffering_ticks,
            fault,
            parameters: TrackParameters::default(),
            auto_play: false,
            rate: 1.0,
            entries: Vec::new(),
            window_index: 0,
            position_ms: 0,
            anchor_ms: self.clock.now_ms(),
            released: false,
        })
    }
}

/// Drain pending notifications, dropping those from engines that were replaced
pub fn pending_events(
    events: &Receiver<TaggedEvent>,
    factory: &SimulatedEngineFactory,
) -> Vec<EngineEvent> {
    let mut current = Vec::new();
    while let Ok((generation, event)) = events.try_recv() {
        if generation == factory.current_generation() {
            current.push(event);
        } else {
            debug!(generation, "Dropping notification from a replaced engine");
        }
    }
    current
}

/// Control surface that logs every update
#[derive(Debug, Default)]
pub struct LoggingSurface {
    updates: Vec<SurfaceUpdate>,
}

impl LoggingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update applied so far
    pub fn updates(&self) -> &[SurfaceUpdate] {
        &self.updates
    }
}

impl ControlSurface for LoggingSurface {
    fn apply(&mut self, update: SurfaceUpdate) {
        match &update {
            SurfaceUpdate::Title { text, visible } => info!(%text, visible, "Title"),
            SurfaceUpdate::RateLabel(label) => info!(%label, "Rate"),
            SurfaceUpdate::ErrorMessage(message) => info!(%message, "Error shown"),
            SurfaceUpdate::Notice(message) => info!(%message, "Notice"),
            other => debug!(update = ?other, "Surface update"),
        }
        self.updates.push(update);
    }
}
