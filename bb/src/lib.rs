//! Layered, persistent bookmarks for text editors.
//!
//! Each open document has a [`BookmarkEngine`] holding its marks per layer, one of which is
//! current at a time. A [`Session`] owns the engines and maps editor events onto them, and marks
//! are persisted across sessions by the [`CacheRepository`].

pub mod cache;
mod command;
pub mod config;
mod dirs;
mod engine;
mod errors;
mod host;
mod session;
mod settings;
mod store;

pub use bb_core::{
    ConfigError, Direction, Layer, LayerName, LayerRing, LayerStyle, RegionSet, Span,
};

pub use self::cache::{CacheEntry, CacheKey, CacheRepository, SaveOutcome, SpanFormat};
pub use self::command::Command;
pub use self::engine::{BookmarkEngine, DocumentState};
pub use self::errors::{CacheError, Error, Result};
pub use self::host::{Host, MarkItem, Rendered, STATUS_KEY};
pub use self::session::Session;
pub use self::settings::{Config, MarkingMode, RestoreMode, StatusLocations};
pub use self::store::BookmarkStore;

pub fn default_cache_dir() -> Option<&'static std::path::Path> {
    dirs::cache()
}
