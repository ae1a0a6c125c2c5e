//! Core domain types for Lumen

mod media_item;

pub use media_item::{MediaItem, MediaKind};
