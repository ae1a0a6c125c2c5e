//! Shared test infrastructure: a recording engine and its factory

#![allow(dead_code)]

use lumen_core::MediaItem;
use lumen_playback::{
    PlaybackConfig, PlaybackEngine, PlaylistEntry, SessionController, SurfaceUpdate,
    TrackParameters,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything one engine instance was asked to do
#[derive(Debug, Default)]
pub struct EngineRecord {
    pub rate: f32,
    pub rate_changes: Vec<f32>,
    pub auto_play: bool,
    pub parameters: TrackParameters,
    pub handle_audio_focus: Option<bool>,
    /// Reported window index (tests move it to simulate progress)
    pub window_index: usize,
    /// Reported content position (tests move it to simulate progress)
    pub position_ms: i64,
    pub seeks: Vec<(usize, u64)>,
    pub prepared: Option<Vec<PlaylistEntry>>,
    pub prepare_calls: usize,
    pub retries: usize,
    pub released: bool,
}

/// Engine that records calls into a shared `EngineRecord`
pub struct MockEngine {
    record: Rc<RefCell<EngineRecord>>,
}

impl PlaybackEngine for MockEngine {
    fn set_track_parameters(&mut self, parameters: TrackParameters) {
        self.record.borrow_mut().parameters = parameters;
    }

    fn track_parameters(&self) -> TrackParameters {
        self.record.borrow().parameters.clone()
    }

    fn set_handle_audio_focus(&mut self, handle: bool) {
        self.record.borrow_mut().handle_audio_focus = Some(handle);
    }

    fn set_auto_play(&mut self, auto_play: bool) {
        self.record.borrow_mut().auto_play = auto_play;
    }

    fn auto_play(&self) -> bool {
        self.record.borrow().auto_play
    }

    fn playback_rate(&self) -> f32 {
        self.record.borrow().rate
    }

    fn set_playback_rate(&mut self, rate: f32) {
        let mut record = self.record.borrow_mut();
        record.rate = rate;
        record.rate_changes.push(rate);
    }

    fn seek_to(&mut self, window_index: usize, position_ms: u64) {
        let mut record = self.record.borrow_mut();
        record.seeks.push((window_index, position_ms));
        record.window_index = window_index;
        record.position_ms = i64::try_from(position_ms).unwrap();
    }

    fn prepare(&mut self, entries: Vec<PlaylistEntry>) {
        let mut record = self.record.borrow_mut();
        record.prepared = Some(entries);
        record.prepare_calls += 1;
    }

    fn current_window_index(&self) -> usize {
        self.record.borrow().window_index
    }

    fn content_position_ms(&self) -> i64 {
        self.record.borrow().position_ms
    }

    fn retry(&mut self) {
        self.record.borrow_mut().retries += 1;
    }

    fn release(&mut self) {
        self.record.borrow_mut().released = true;
    }
}

/// Keeps the record of every engine a factory created
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: Rc<RefCell<Vec<Rc<RefCell<EngineRecord>>>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory creating recording engines at rate 1.0
    pub fn factory(&self) -> impl FnMut() -> Box<dyn PlaybackEngine> {
        let engines = self.engines.clone();
        move || {
            let record = Rc::new(RefCell::new(EngineRecord {
                rate: 1.0,
                ..Default::default()
            }));
            engines.borrow_mut().push(record.clone());
            Box::new(MockEngine { record }) as Box<dyn PlaybackEngine>
        }
    }

    /// Number of engines created so far
    pub fn created(&self) -> usize {
        self.engines.borrow().len()
    }

    /// Number of engines not yet released
    pub fn live(&self) -> usize {
        self.engines
            .borrow()
            .iter()
            .filter(|e| !e.borrow().released)
            .count()
    }

    /// Record of the `index`-th engine created
    pub fn engine(&self, index: usize) -> Rc<RefCell<EngineRecord>> {
        self.engines.borrow()[index].clone()
    }

    /// Record of the most recently created engine
    pub fn latest(&self) -> Rc<RefCell<EngineRecord>> {
        self.engines
            .borrow()
            .last()
            .cloned()
            .expect("no engine created")
    }
}

pub type TestController =
    SessionController<Box<dyn FnMut() -> Box<dyn PlaybackEngine>>, Vec<SurfaceUpdate>>;

/// Controller over recording engines and a recording surface
pub fn controller(registry: &EngineRegistry, config: PlaybackConfig) -> TestController {
    let factory: Box<dyn FnMut() -> Box<dyn PlaybackEngine>> = Box::new(registry.factory());
    SessionController::new(config, factory, Vec::new())
}

pub fn item(source: &str, title: &str) -> MediaItem {
    MediaItem::new(source, title)
}

/// Two-item playlist: an HLS stream and a progressive MP4
pub fn two_items() -> Vec<MediaItem> {
    vec![item("a.m3u8", "A"), item("b.mp4", "B")]
}
