/// Media item domain types
use serde::{Deserialize, Serialize};

/// One playable unit handed to a playback screen
///
/// Immutable once constructed. A screen replaces its whole item list when a
/// new playback intent arrives, it never edits items in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    source: String,

    #[serde(default)]
    title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_hint: Option<String>,
}

/// Broad media family of an item, used for display decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Video content (title overlay hidden)
    Video,
    /// Audio-only content
    Audio,
    /// Known MIME type that is neither audio nor video (manifests, images...)
    Other,
    /// No MIME type could be inferred
    Unknown,
}

impl MediaItem {
    /// Create a new media item
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            mime_hint: None,
        }
    }

    /// Attach an explicit MIME type, overriding extension-based inference
    #[must_use]
    pub fn with_mime_hint(mut self, mime: impl Into<String>) -> Self {
        self.mime_hint = Some(mime.into());
        self
    }

    /// Source URI as supplied (possibly percent-encoded)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Explicit MIME type, if one was supplied
    pub fn mime_hint(&self) -> Option<&str> {
        self.mime_hint.as_deref()
    }

    /// Best-known MIME type: the hint, else a guess from the source extension
    pub fn mime_type(&self) -> Option<String> {
        if let Some(hint) = &self.mime_hint {
            return Some(hint.to_ascii_lowercase());
        }

        let ext = extension_of(&self.source)?;
        mime_guess::from_ext(&ext).first_raw().map(str::to_string)
    }

    /// Infer the media family of this item
    pub fn media_kind(&self) -> MediaKind {
        match self.mime_type() {
            Some(mime) if mime.starts_with("video/") => MediaKind::Video,
            Some(mime) if mime.starts_with("audio/") => MediaKind::Audio,
            Some(_) => MediaKind::Other,
            None => MediaKind::Unknown,
        }
    }

    /// Whether the title overlay should be visible while this item plays
    ///
    /// Video draws its own picture, so the overlay is hidden only for video.
    pub fn shows_title_overlay(&self) -> bool {
        self.media_kind() != MediaKind::Video
    }
}

/// File extension of the last path segment, ignoring query and fragment
fn extension_of(source: &str) -> Option<String> {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}
