//! Lumen Core
//!
//! Platform-agnostic media types and error handling for Lumen.
//!
//! This crate provides the building blocks shared by the playback session
//! controller and the host applications:
//! - **Domain Types**: `MediaItem`, `MediaKind`
//! - **Intent Payloads**: decoding the serialized item list a screen is opened with
//! - **Error Handling**: unified `LumenError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{payload, MediaItem, MediaKind};
//!
//! let items = payload::decode_items(Some(
//!     r#"[{"source": "https://cdn.example.com/talk.mp4", "title": "Talk"}]"#,
//! ))
//! .unwrap();
//!
//! assert_eq!(items[0].title(), "Talk");
//! assert_eq!(items[0].media_kind(), MediaKind::Video);
//!
//! let podcast = MediaItem::new("https://cdn.example.com/episode.mp3", "Episode 1");
//! assert!(podcast.shows_title_overlay());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod payload;
pub mod types;

pub use error::{LumenError, Result};
pub use types::{MediaItem, MediaKind};
