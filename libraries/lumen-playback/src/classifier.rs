//! Engine error classification
//!
//! Decides whether a playback failure is live-window drift, which the
//! controller recovers from silently, or something the user has to see.

use crate::engine::{BehindLiveWindow, DecoderInitError, DecoderQueryError, EngineError, ErrorStage};
use std::error::Error as StdError;
use std::fmt;

/// User-facing reason for a failure that is not recovered automatically
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No decoder is available for the format
    NoDecoder { mime_type: String },

    /// The format needs a secure decoder the device does not have
    NoSecureDecoder { mime_type: String },

    /// The device could not be asked which decoders it has
    DecoderQueryFailed,

    /// A decoder was found but could not be created
    DecoderInstantiation { codec_name: String },

    /// Anything else
    Generic,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoDecoder { mime_type } => {
                write!(f, "This device does not provide a decoder for {}", mime_type)
            }
            FailureReason::NoSecureDecoder { mime_type } => write!(
                f,
                "This device does not provide a secure decoder for {}",
                mime_type
            ),
            FailureReason::DecoderQueryFailed => f.write_str("Unable to query device decoders"),
            FailureReason::DecoderInstantiation { codec_name } => {
                write!(f, "Unable to instantiate decoder {}", codec_name)
            }
            FailureReason::Generic => f.write_str("Playback failed"),
        }
    }
}

/// Outcome of classifying an engine failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// The seek position drifted out of a live stream's window; restart at the live edge
    RecoverableLiveWindowDrift,

    /// Show the failure to the user; no automatic recovery
    SurfaceToUser(FailureReason),
}

/// Classify an engine failure
pub fn classify(error: &EngineError) -> ErrorClass {
    if is_behind_live_window(error) {
        ErrorClass::RecoverableLiveWindowDrift
    } else {
        ErrorClass::SurfaceToUser(failure_reason(error))
    }
}

/// Whether a source-stage failure has live-window drift anywhere in its cause chain
pub fn is_behind_live_window(error: &EngineError) -> bool {
    if error.stage() != ErrorStage::Source {
        return false;
    }

    let mut cause: Option<&(dyn StdError + 'static)> = Some(error.cause());
    while let Some(err) = cause {
        if err.is::<BehindLiveWindow>() {
            return true;
        }
        cause = err.source();
    }

    false
}

/// Map a failure to the message shown to the user
///
/// Only renderer failures caused by decoder initialization get a specific
/// message.
pub fn failure_reason(error: &EngineError) -> FailureReason {
    if error.stage() != ErrorStage::Renderer {
        return FailureReason::Generic;
    }

    let Some(init) = error.cause().downcast_ref::<DecoderInitError>() else {
        return FailureReason::Generic;
    };

    match &init.codec_name {
        Some(codec_name) => FailureReason::DecoderInstantiation {
            codec_name: codec_name.clone(),
        },
        None if init
            .cause
            .as_ref()
            .is_some_and(|cause| cause.is::<DecoderQueryError>()) =>
        {
            FailureReason::DecoderQueryFailed
        }
        None if init.secure_decoder_required => FailureReason::NoSecureDecoder {
            mime_type: init.mime_type.clone(),
        },
        None => FailureReason::NoDecoder {
            mime_type: init.mime_type.clone(),
        },
    }
}
