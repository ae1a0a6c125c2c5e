//! Playback engine abstraction
//!
//! The adaptive-streaming engine (demuxing, decoding, buffering, bitrate
//! selection) is a black box. The controller only talks to it through
//! `PlaybackEngine`, creates instances through `EngineFactory`, and observes it
//! through `EngineEvent`s delivered in order on the control thread.

use crate::playlist::PlaylistEntry;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error used in engine cause chains
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Engine-defined track selection parameters
///
/// Opaque to the controller: it is captured from one engine instance,
/// persisted, and handed back to the next. `Null` means the engine's
/// default parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackParameters(serde_json::Value);

impl TrackParameters {
    /// Wrap an engine-specific encoded parameter value
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Encode an engine-specific parameter struct
    pub fn encode<T: Serialize>(parameters: &T) -> crate::Result<Self> {
        Ok(Self(serde_json::to_value(parameters)?))
    }

    /// Decode back into an engine-specific parameter struct
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_value(self.0.clone())?)
    }

    /// The encoded value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Whether this is the engine's default parameter set
    pub fn is_default(&self) -> bool {
        self.0.is_null()
    }
}

/// Kind of a track group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Metadata,
}

/// One group of interchangeable tracks (e.g. the renditions of a video)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGroup {
    /// Group kind
    pub kind: TrackKind,

    /// Format identifiers of the tracks in this group
    pub formats: Vec<String>,
}

impl TrackGroup {
    /// Create a track group
    pub fn new(kind: TrackKind, formats: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }
}

/// The full set of track groups exposed by the current item
///
/// Compared by value to tell a genuine track change from a re-notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGroups(Vec<TrackGroup>);

impl TrackGroups {
    /// Create a track group set
    pub fn new(groups: Vec<TrackGroup>) -> Self {
        Self(groups)
    }

    /// Groups in engine order
    pub fn groups(&self) -> &[TrackGroup] {
        &self.0
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no groups
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any group carries video
    pub fn has_video(&self) -> bool {
        self.0.iter().any(|g| g.kind == TrackKind::Video)
    }
}

/// Engine playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing prepared, or stopped after a failure
    Idle,

    /// Waiting for data
    Buffering,

    /// Able to play immediately
    Ready,

    /// Reached the end of the playlist
    Ended,
}

/// Pipeline stage an engine failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorStage {
    /// Loading media (network, manifest, container)
    Source,

    /// Rendering (decoder initialization or decoding)
    Renderer,

    /// Unexpected runtime failure inside the engine
    Unexpected,

    /// Remote playback component
    Remote,
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorStage::Source => "source",
            ErrorStage::Renderer => "renderer",
            ErrorStage::Unexpected => "unexpected",
            ErrorStage::Remote => "remote",
        };
        f.write_str(name)
    }
}

/// Failure reported by a playback engine
#[derive(Debug, Error)]
#[error("{stage} error: {source}")]
pub struct EngineError {
    stage: ErrorStage,
    source: BoxError,
}

impl EngineError {
    /// Create an engine error for `stage` caused by `source`
    pub fn new(stage: ErrorStage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// Failure while loading media
    pub fn source_stage(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorStage::Source, source)
    }

    /// Failure while rendering
    pub fn renderer(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorStage::Renderer, source)
    }

    /// Unexpected engine failure
    pub fn unexpected(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorStage::Unexpected, source)
    }

    /// Stage the failure came from
    pub fn stage(&self) -> ErrorStage {
        self.stage
    }

    /// Immediate cause (the source, renderer or unexpected exception)
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// A seek position fell outside the window a live stream still retains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("seek position fell behind the retained live window")]
pub struct BehindLiveWindow;

/// Loading a source failed, optionally because of a deeper fault
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceLoadError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl SourceLoadError {
    /// Load failure without a known cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Load failure wrapping a deeper fault
    pub fn caused_by(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }
}

/// Querying the device for decoders failed
#[derive(Debug, Error)]
#[error("failed to query decoders: {0}")]
pub struct DecoderQueryError(pub String);

/// A decoder could not be initialized for a format
#[derive(Debug, Error)]
#[error("decoder init failed for {mime_type}")]
pub struct DecoderInitError {
    /// MIME type of the format being decoded
    pub mime_type: String,

    /// Whether the format needs a secure (DRM) decoder
    pub secure_decoder_required: bool,

    /// Name of the decoder that failed to instantiate, if one was found
    pub codec_name: Option<String>,

    #[source]
    pub cause: Option<BoxError>,
}

impl DecoderInitError {
    /// No decoder was found for `mime_type`
    pub fn missing(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            secure_decoder_required: false,
            codec_name: None,
            cause: None,
        }
    }

    /// Mark the format as requiring a secure decoder
    #[must_use]
    pub fn secure(mut self) -> Self {
        self.secure_decoder_required = true;
        self
    }

    /// Record the decoder that was found but failed to instantiate
    #[must_use]
    pub fn with_codec(mut self, name: impl Into<String>) -> Self {
        self.codec_name = Some(name.into());
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Notifications delivered by an engine instance, in order, on the control thread
#[derive(Debug)]
pub enum EngineEvent {
    /// Playback state or auto-play flag changed
    StateChanged { auto_play: bool, state: EngineState },

    /// Available tracks changed; `current_tag` is the playlist index of the
    /// item now playing
    TracksChanged {
        groups: TrackGroups,
        current_tag: Option<usize>,
    },

    /// Playback failed
    Error(EngineError),

    /// The engine's own controls were shown or hidden
    ControllerVisibility(bool),
}

/// One live playback engine instance
///
/// Attach and detach calls return immediately; readiness and failures are
/// reported later as `EngineEvent`s.
pub trait PlaybackEngine {
    /// Apply track selection parameters
    fn set_track_parameters(&mut self, parameters: TrackParameters);

    /// Current track selection parameters
    fn track_parameters(&self) -> TrackParameters;

    /// Let the engine request and react to audio focus
    fn set_handle_audio_focus(&mut self, handle: bool);

    /// Start playing as soon as ready
    fn set_auto_play(&mut self, auto_play: bool);

    /// Whether playback starts/continues as soon as ready
    fn auto_play(&self) -> bool;

    /// Current playback rate
    fn playback_rate(&self) -> f32;

    /// Change the playback rate
    fn set_playback_rate(&mut self, rate: f32);

    /// Seek to `position_ms` within playlist window `window_index`
    fn seek_to(&mut self, window_index: usize, position_ms: u64);

    /// Attach the playlist and begin loading
    fn prepare(&mut self, entries: Vec<PlaylistEntry>);

    /// Index of the window being played
    fn current_window_index(&self) -> usize;

    /// Content position in the current window
    ///
    /// May be transiently negative while the engine is being torn down.
    fn content_position_ms(&self) -> i64;

    /// Re-prepare after a failure, keeping the attached playlist
    fn retry(&mut self);

    /// Release the instance and everything attached to it (ad and overlay
    /// resources included). The instance is unusable afterwards.
    fn release(&mut self);
}

/// Creates fresh engine instances
pub trait EngineFactory {
    /// Create a new, unprepared engine instance
    fn create(&mut self) -> Box<dyn PlaybackEngine>;
}

impl<F> EngineFactory for F
where
    F: FnMut() -> Box<dyn PlaybackEngine>,
{
    fn create(&mut self) -> Box<dyn PlaybackEngine> {
        self()
    }
}
