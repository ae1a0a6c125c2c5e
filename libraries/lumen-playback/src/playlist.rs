//! Playlist building
//!
//! Turns the ordered `MediaItem` list into the ordered sources attached to an
//! engine. Each entry keeps the position of the item it came from so the
//! engine's current tag can be mapped back to a title, even when unsupported
//! items were skipped.

use lumen_core::MediaItem;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// How an engine has to load a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    /// Segmented adaptive stream described by an HLS manifest
    Adaptive,

    /// Single progressive file or stream
    Progressive,

    /// Manifest format the engine is not built with, or an unusable URI
    Unsupported,
}

/// One source ready to be attached to an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Position of the originating item in the input list
    pub index: usize,

    /// Percent-decoded source URI handed to the engine
    pub source: String,

    /// Loading strategy
    pub content_kind: ContentKind,
}

/// Build the engine playlist for `items`
///
/// Unsupported items are left out; every other item keeps its input order and
/// its input position as `index`. No I/O is performed.
pub fn build(items: &[MediaItem]) -> Vec<PlaylistEntry> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let Some(source) = decode_source(item.source()) else {
                debug!(index, source = item.source(), "Skipping undecodable source");
                return None;
            };

            match infer_content_kind(&source) {
                ContentKind::Unsupported => {
                    debug!(index, %source, "Skipping unsupported source");
                    None
                }
                content_kind => Some(PlaylistEntry {
                    index,
                    source,
                    content_kind,
                }),
            }
        })
        .collect()
}

/// Percent-decode a source URI
///
/// Returns `None` if the decoded bytes are not UTF-8.
pub fn decode_source(source: &str) -> Option<String> {
    urlencoding::decode(source).ok().map(|s| s.into_owned())
}

/// Classify a decoded source URI by its path
pub fn infer_content_kind(source: &str) -> ContentKind {
    let source = source.trim();
    if source.is_empty() {
        return ContentKind::Unsupported;
    }

    let path = match Url::parse(source) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => source
            .split(['?', '#'])
            .next()
            .unwrap_or(source)
            .to_ascii_lowercase(),
    };

    if path.ends_with(".m3u8") {
        ContentKind::Adaptive
    } else if is_unsupported_manifest(&path) {
        ContentKind::Unsupported
    } else {
        ContentKind::Progressive
    }
}

fn is_unsupported_manifest(path: &str) -> bool {
    const SUFFIXES: [&str; 5] = [".mpd", ".ism", ".isml", ".ism/manifest", ".isml/manifest"];
    SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}
