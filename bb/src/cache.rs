//! Bookmarks persisted across sessions, one file per document.
//!
//! Entries live in a flat directory and are named after a hash of the document's absolute path,
//! which keeps file names short and free of path separators. Each file is a JSON object of the
//! form `{"filename": <path>, "bookmarks": {<layer>: [[a, b], ...]}}`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bb_core::{LayerName, LayerRing, Span};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stdx::path::PathExt;
use twox_hash::XxHash64;

use crate::errors::CacheError;
use crate::store::BookmarkStore;

pub const CACHE_EXTENSION: &str = "bb_cache";

/// The cache file stem of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Which endpoint order spans are written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanFormat {
    /// `[begin, end]`
    Normalized,
    /// `[anchor, head]`, as the selection was made
    Raw,
}

impl SpanFormat {
    #[inline]
    pub fn apply(self, span: Span) -> Span {
        match self {
            SpanFormat::Normalized => span.normalize(),
            SpanFormat::Raw => span,
        }
    }
}

/// Marks per layer, in the order the layers were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks(Vec<(LayerName, Vec<Span>)>);

impl Bookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer, replacing the spans of an earlier entry with the same name.
    pub fn insert(&mut self, layer: impl Into<LayerName>, spans: Vec<Span>) {
        let layer = layer.into();
        match self.0.iter_mut().find(|(name, _)| *name == layer) {
            Some((_, existing)) => *existing = spans,
            None => self.0.push((layer, spans)),
        }
    }

    pub fn get(&self, layer: &str) -> Option<&[Span]> {
        self.0.iter().find(|(name, _)| name == layer).map(|(_, spans)| spans.as_slice())
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&LayerName, &[Span])> {
        self.0.iter().map(|(name, spans)| (name, spans.as_slice()))
    }

    pub fn layers(&self) -> impl ExactSizeIterator<Item = &LayerName> {
        self.0.iter().map(|(name, _)| name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Bookmarks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spans) in &self.0 {
            map.serialize_entry(name, spans)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bookmarks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BookmarksVisitor;

        impl<'de> Visitor<'de> for BookmarksVisitor {
            type Value = Bookmarks;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of layer names to lists of `[start, end]` pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut bookmarks = Bookmarks::new();
                while let Some((name, spans)) = map.next_entry::<LayerName, Vec<Span>>()? {
                    bookmarks.insert(name, spans);
                }
                Ok(bookmarks)
            }
        }

        deserializer.deserialize_map(BookmarksVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The absolute path of the document the bookmarks belong to.
    pub filename: PathBuf,
    pub bookmarks: Bookmarks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The store had no marks and there was no entry, nothing was written.
    Skipped,
    /// The store had no marks, the previous entry was deleted.
    Removed,
    Written(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CacheRepository {
    dir: PathBuf,
}

impl CacheRepository {
    /// Use `dir` as the cache directory, creating it if necessary.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CacheError::Open { path: dir.clone(), source })?;
        tracing::debug!(dir = %dir.display(), "opened bookmark cache");
        Ok(Self { dir })
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_for(&self, path: &Path) -> CacheKey {
        let path = document_path(path);
        CacheKey(XxHash64::oneshot(0, path.as_os_str().as_encoded_bytes()))
    }

    /// The cache file of the document at `path`.
    pub fn path_for(&self, path: &Path) -> PathBuf {
        self.dir.join(format!("{}.{CACHE_EXTENSION}", self.key_for(path)))
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.path_for(path).is_file()
    }

    /// Write the marks of all layers in `store`, replacing the previous entry.
    /// A store without marks writes nothing and deletes the previous entry, so documents that were
    /// never marked don't leave files behind and cleared marks don't come back.
    pub fn save(
        &self,
        path: &Path,
        store: &BookmarkStore,
        ring: &LayerRing,
        format: SpanFormat,
    ) -> Result<SaveOutcome, CacheError> {
        let document = document_path(path);
        if !store.has_marks() {
            tracing::debug!(path = %document.display(), "no bookmarks to cache");
            let removed = self.remove(&document)?;
            return Ok(if removed { SaveOutcome::Removed } else { SaveOutcome::Skipped });
        }

        let cache_path = self.path_for(&document);
        let entry = CacheEntry { filename: document, bookmarks: store.snapshot(ring, format) };
        let write_err = |source| CacheError::Write { path: cache_path.clone(), source };
        let json = serde_json::to_vec(&entry).map_err(|err| write_err(io::Error::from(err)))?;

        // Write then rename so a failed write doesn't clobber the previous entry.
        let tmp = cache_path.with_extension(format!("{CACHE_EXTENSION}.tmp"));
        fs::write(&tmp, json).map_err(write_err)?;
        if let Err(err) = fs::rename(&tmp, &cache_path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                tracing::warn!(tmp = %tmp.display(), err = %cleanup, "failed to remove temporary cache file");
            }
            return Err(write_err(err));
        }

        tracing::info!(path = %entry.filename.display(), cache = %cache_path.display(), "cached bookmarks");
        Ok(SaveOutcome::Written(cache_path))
    }

    /// Read the entry of the document at `path`.
    pub fn try_load(&self, path: &Path) -> Result<CacheEntry, CacheError> {
        let cache_path = self.path_for(path);
        let bytes = fs::read(&cache_path)
            .map_err(|source| CacheError::Read { path: cache_path.clone(), source })?;
        serde_json::from_slice(&bytes).map_err(|source| CacheError::Malformed { path: cache_path, source })
    }

    /// Like [`CacheRepository::try_load`] but any failure just means there are no bookmarks.
    /// Entries recorded for a different document (a hash collision) are ignored as well.
    pub fn load(&self, path: &Path) -> Option<CacheEntry> {
        let document = document_path(path);
        match self.try_load(&document) {
            Ok(entry) if entry.filename == document => {
                tracing::info!(path = %document.display(), layers = entry.bookmarks.len(), "loaded cached bookmarks");
                Some(entry)
            }
            Ok(entry) => {
                tracing::warn!(
                    path = %document.display(),
                    other = %entry.filename.display(),
                    "cache entry belongs to another document"
                );
                None
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(path = %document.display(), "no cached bookmarks");
                None
            }
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable bookmark cache");
                None
            }
        }
    }

    /// Delete the entry of the document at `path`. Returns whether there was one.
    pub fn remove(&self, path: &Path) -> Result<bool, CacheError> {
        let cache_path = self.path_for(path);
        match fs::remove_file(&cache_path) {
            Ok(()) => {
                tracing::info!(cache = %cache_path.display(), "removed bookmark cache");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Remove { path: cache_path, source }),
        }
    }
}

/// The absolute path documents are identified by.
pub(crate) fn document_path(path: &Path) -> PathBuf {
    path.absolutize().unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "failed to make document path absolute");
        path.to_path_buf()
    })
}
