use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bb_core::ConfigError;
use rustc_hash::FxHashMap;
use stdx::sync::Latch;

use crate::cache::{document_path, CacheRepository};
use crate::command::Command;
use crate::config::Setting;
use crate::engine::BookmarkEngine;
use crate::errors::{Error, Result};
use crate::host::Host;
use crate::settings::Config;

/// The bookmark engines of all open documents, and the state they share: settings, the cache
/// and whether a document was activated yet.
///
/// The host adapter forwards editor events to the `on_*` methods and bookmark commands to
/// [`Session::execute`].
#[derive(Debug)]
pub struct Session {
    settings: Setting<Arc<Config>>,
    cache: CacheRepository,
    activated: Latch,
    documents: FxHashMap<PathBuf, BookmarkEngine>,
}

impl Session {
    pub fn new(config: Config, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let cache = CacheRepository::open(cache_dir)?;
        Ok(Self {
            settings: Setting::new(Arc::new(config)),
            cache,
            activated: Latch::new(),
            documents: Default::default(),
        })
    }

    /// A session caching into the user's cache directory.
    pub fn with_default_cache(config: Config) -> Result<Self> {
        let dir = crate::dirs::cache().ok_or(Error::NoCacheDir)?;
        Self::new(config, dir)
    }

    pub fn config(&self) -> Arc<Config> {
        self.settings.read().clone()
    }

    #[inline]
    pub fn cache(&self) -> &CacheRepository {
        &self.cache
    }

    /// The engine of the document at `path`, creating it if the document isn't open yet.
    pub fn open(&mut self, path: &Path) -> Result<&mut BookmarkEngine, ConfigError> {
        match self.documents.entry(document_path(path)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::debug!(path = %entry.key().display(), "opened document");
                let engine =
                    BookmarkEngine::new(entry.key(), self.settings.clone(), self.cache.clone())?;
                Ok(entry.insert(engine))
            }
        }
    }

    pub fn document(&self, path: &Path) -> Option<&BookmarkEngine> {
        self.documents.get(&document_path(path))
    }

    pub fn documents(&self) -> impl Iterator<Item = &BookmarkEngine> {
        self.documents.values()
    }

    pub fn execute(
        &mut self,
        host: &mut dyn Host,
        path: &Path,
        command: Command,
    ) -> Result<(), ConfigError> {
        self.open(path)?.execute(host, command)
    }

    /// Like [`Session::execute`] for a command given as a JSON object.
    pub fn execute_json(
        &mut self,
        host: &mut dyn Host,
        path: &Path,
        json: &str,
    ) -> Result<(), ConfigError> {
        let command = Command::from_json(json).inspect_err(|err| {
            tracing::error!(%err, "invalid bookmark command");
            host.error_message(&err.to_string());
        })?;
        self.execute(host, path, command)
    }

    /// The document at `path` was loaded from disk.
    pub fn on_loaded(&mut self, host: &mut dyn Host, path: &Path) -> Result<(), ConfigError> {
        if self.settings.read().uncache_marks_on_load {
            self.execute(host, path, Command::OnLoad)
        } else {
            self.open(path).map(|_| ())
        }
    }

    /// The document at `path` gained focus. The first activation of the session loads cached
    /// marks regardless of settings, as hosts may not report documents restored at startup as
    /// loaded. Returns whether marks were loaded.
    pub fn on_activated(&mut self, host: &mut dyn Host, path: &Path) -> Result<bool, ConfigError> {
        self.open(path)?;
        if !self.activated.trip() {
            return Ok(false);
        }

        tracing::debug!(path = %path.display(), "first activation, loading cached marks");
        self.execute(host, path, Command::OnLoad)?;
        Ok(true)
    }

    /// The document at `path` is about to be written.
    pub fn on_pre_save(&mut self, host: &mut dyn Host, path: &Path) -> Result<(), ConfigError> {
        if self.settings.read().cache_marks_on_save {
            self.execute(host, path, Command::OnSave)?;
        }
        Ok(())
    }

    /// The document was closed. Documents without a path have nothing to cache.
    pub fn on_closed(&mut self, host: &mut dyn Host, path: Option<&Path>) -> Result<(), ConfigError> {
        let Some(path) = path else { return Ok(()) };
        let result = self.execute(host, path, Command::OnClose);
        self.documents.remove(&document_path(path));
        result
    }

    /// Replace the settings of all documents. Each engine applies them before its next operation.
    pub fn reconfigure(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        tracing::info!("reconfigured bookmarks");
        self.settings.write(Arc::new(config));
        Ok(())
    }

    /// Make the next activation load cached marks again.
    pub fn reset_latch(&self) {
        self.activated.reset();
    }
}
