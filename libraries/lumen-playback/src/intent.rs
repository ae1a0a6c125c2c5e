//! Intent boundary
//!
//! A screen must open even when its payload is missing or broken; it then
//! shows that there is nothing to play.

use lumen_core::{payload, MediaItem};
use tracing::warn;

/// Decode the item list a screen was opened with
///
/// Missing or malformed payloads yield an empty list.
pub fn items_from_payload(payload: Option<&str>) -> Vec<MediaItem> {
    match payload::decode_items(payload) {
        Ok(items) => items,
        Err(e) => {
            warn!("Ignoring playback payload: {}", e);
            Vec::new()
        }
    }
}
