//! Intent payload decoding
//!
//! A playback screen is opened with a serialized list of `{source, title}`
//! records. These helpers turn that payload into `MediaItem`s.

use crate::error::{LumenError, Result};
use crate::types::MediaItem;

/// Decode an intent payload into an ordered list of media items
///
/// # Errors
/// Returns `MissingPayload` if there is no payload and `InvalidPayload` if it
/// is not a JSON array of media item records.
pub fn decode_items(payload: Option<&str>) -> Result<Vec<MediaItem>> {
    let payload = payload.ok_or(LumenError::MissingPayload)?;

    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_array() {
        return Err(LumenError::invalid_payload("expected a list of media items"));
    }

    Ok(serde_json::from_value(value)?)
}

/// Encode media items into the payload format accepted by `decode_items`
///
/// # Errors
/// Returns a serialization error if encoding fails.
pub fn encode_items(items: &[MediaItem]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}
