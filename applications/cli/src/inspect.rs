/// Playlist inspection
use lumen_core::{MediaItem, MediaKind};
use lumen_playback::{playlist, ContentKind};
use std::fmt;

/// How one input item would be played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRow {
    pub index: usize,
    pub title: String,
    pub media_kind: MediaKind,
    pub content_kind: ContentKind,
    /// Decoded source, if the item is attached
    pub attached_source: Option<String>,
}

impl fmt::Display for InspectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<12} {:<8} {}",
            self.index,
            format!("{:?}", self.content_kind),
            format!("{:?}", self.media_kind),
            self.title
        )?;
        if let Some(source) = &self.attached_source {
            write!(f, "  <{}>", source)?;
        }
        Ok(())
    }
}

/// Describe every item, attached or skipped
pub fn inspect(items: &[MediaItem]) -> Vec<InspectRow> {
    let entries = playlist::build(items);

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let entry = entries.iter().find(|e| e.index == index);
            InspectRow {
                index,
                title: item.title().to_string(),
                media_kind: item.media_kind(),
                content_kind: entry.map_or(ContentKind::Unsupported, |e| e.content_kind),
                attached_source: entry.map(|e| e.source.clone()),
            }
        })
        .collect()
}
