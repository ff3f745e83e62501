use std::path::{Path, PathBuf};
use std::sync::Arc;

use bb_core::{ConfigError, Direction, Layer, LayerName, LayerRing, RegionSet, Span};

use crate::cache::{document_path, CacheRepository};
use crate::command::Command;
use crate::config::Setting;
use crate::host::{Host, MarkItem, Rendered, STATUS_KEY};
use crate::settings::{Config, MarkingMode, StatusLocations};
use crate::store::BookmarkStore;

static NO_MARKS: RegionSet = RegionSet::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    /// No cached marks have been loaded yet.
    Unloaded,
    Loaded,
    /// Marks changed since the document was loaded or saved.
    Modified,
    Saved,
    Closed,
}

/// The bookmarks of one open document.
#[derive(Debug)]
pub struct BookmarkEngine {
    path: PathBuf,
    store: BookmarkStore,
    ring: LayerRing,
    config: Arc<Config>,
    settings: Setting<Arc<Config>>,
    cache: CacheRepository,
    state: DocumentState,
}

impl BookmarkEngine {
    pub fn new(
        path: &Path,
        settings: Setting<Arc<Config>>,
        cache: CacheRepository,
    ) -> Result<Self, ConfigError> {
        let config = settings.read().clone();
        let ring = config.layer_ring()?;
        Ok(Self {
            path: document_path(path),
            store: BookmarkStore::new(),
            ring,
            config,
            settings,
            cache,
            state: DocumentState::Unloaded,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    #[inline]
    pub fn ring(&self) -> &LayerRing {
        &self.ring
    }

    #[inline]
    pub fn state(&self) -> DocumentState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn current_layer(&self) -> &Layer {
        self.ring.current()
    }

    /// The marks of `layer`, empty if it was never marked.
    pub fn regions(&self, layer: &str) -> &RegionSet {
        self.store.regions(layer).unwrap_or(&NO_MARKS)
    }

    /// What the host should currently display.
    pub fn rendered(&self) -> Rendered<'_> {
        let layer = self.ring.current();
        Rendered { layer, regions: self.regions(layer.name()) }
    }

    /// Run a command against this document. Invalid arguments are reported to the user through
    /// the host and returned; cache failures are only logged.
    #[tracing::instrument(skip_all, fields(path = %self.path.display(), %command))]
    pub fn execute(&mut self, host: &mut dyn Host, command: Command) -> Result<(), ConfigError> {
        self.sync_settings();

        let result = match command {
            Command::MarkLine { line, layer } => self.mark_line(host, line, layer),
            Command::CycleMark { direction } => {
                host.navigate(direction, self.rendered().regions);
                Ok(())
            }
            Command::ShowMarks => {
                self.show_marks(host);
                Ok(())
            }
            Command::ClearMarks { layer } => {
                let layer = layer.unwrap_or_else(|| self.ring.current_name().clone());
                self.store.clear_layer(&layer);
                self.state = DocumentState::Modified;
                self.render(host);
                Ok(())
            }
            Command::ClearAll => {
                self.store.clear_all();
                self.state = DocumentState::Modified;
                self.render(host);
                Ok(())
            }
            Command::LayerSwap { direction } => {
                self.layer_swap(host, direction);
                Ok(())
            }
            Command::OnLoad => self.on_load(host),
            Command::OnSave => {
                self.save();
                Ok(())
            }
            Command::OnClose => {
                self.on_close();
                Ok(())
            }
        };

        if let Err(err) = &result {
            tracing::error!(%err, "bookmark command failed");
            host.error_message(&err.to_string());
        }

        result
    }

    /// Apply new settings. The layer ring is only rebuilt when the layers changed, in which case
    /// the first configured layer becomes current.
    pub fn reconfigure(&mut self, config: Arc<Config>) -> Result<(), ConfigError> {
        if config.layer_icons != self.config.layer_icons {
            self.ring.reconfigure(config.layer_icons.iter().cloned())?;
            tracing::info!(ring = ?self.ring, "rebuilt layer ring");
        }
        self.config = config;
        Ok(())
    }

    /// Pick up settings written through a shared [`Setting`] since the last operation.
    fn sync_settings(&mut self) {
        let Some(config) = self.settings.read_changed().map(|config| Arc::clone(&config)) else {
            return;
        };

        if let Err(err) = self.reconfigure(config) {
            tracing::error!(%err, "ignoring invalid settings");
        }
    }

    fn mark_line(
        &mut self,
        host: &mut dyn Host,
        line: Option<Vec<Span>>,
        layer: Option<LayerName>,
    ) -> Result<(), ConfigError> {
        let layer = match layer {
            Some(layer) if !self.ring.contains(&layer) => {
                return Err(ConfigError::UnknownLayer(layer));
            }
            Some(layer) => layer,
            None => self.ring.current_name().clone(),
        };

        let spans = match line {
            Some(spans) => spans,
            None => self.resolve_marks(&*host),
        };

        if spans.is_empty() {
            tracing::debug!("nothing to mark");
            return Ok(());
        }

        tracing::debug!(%layer, ?spans, "toggling marks");
        self.store.toggle(&layer, spans);
        self.state = DocumentState::Modified;

        if layer == *self.ring.current_name() {
            self.render(host);
        }

        Ok(())
    }

    fn resolve_marks(&self, host: &dyn Host) -> Vec<Span> {
        let selections = host.selections();
        match self.config.marking_mode {
            MarkingMode::Selection => selections,
            MarkingMode::Line => {
                selections.first().map(|&primary| host.lines(primary)).unwrap_or_default()
            }
        }
    }

    fn show_marks(&self, host: &mut dyn Host) {
        let regions = self.rendered().regions;
        if regions.is_empty() {
            tracing::debug!(layer = %self.ring.current_name(), "no marks to show");
            return;
        }

        let items = regions
            .iter()
            .map(|span| {
                let text = host.text(span);
                let text = if text.is_empty() { format!("empty region {span}") } else { text };
                MarkItem { span, text }
            })
            .collect::<Vec<_>>();
        host.show_marks(&items);
    }

    fn layer_swap(&mut self, host: &mut dyn Host, direction: Direction) {
        let layer = self.ring.rotate(direction);
        tracing::debug!(layer = %layer.name(), "swapped layer");
        self.change_to_layer(host);
    }

    /// Announce the current layer on the configured status surfaces and draw its marks.
    fn change_to_layer(&self, host: &mut dyn Host) {
        let name = self.ring.current_name();
        let locations = self.config.layer_status_location;

        if locations.contains(StatusLocations::TEMPORARY) {
            host.status_message(name);
        }

        if locations.contains(StatusLocations::PERMANENT) {
            host.set_status(STATUS_KEY, Some(format!("Bookmark Layer: {name}").as_str()));
        } else {
            host.set_status(STATUS_KEY, None);
        }

        if locations.contains(StatusLocations::POPUP) {
            host.show_popup(name);
        }

        self.render(host);
    }

    fn render(&self, host: &mut dyn Host) {
        host.render(self.rendered());
    }

    fn on_load(&mut self, host: &mut dyn Host) -> Result<(), ConfigError> {
        if let Some(entry) = self.cache.load(&self.path) {
            for layer in entry.bookmarks.layers().filter(|layer| !self.ring.contains(layer)) {
                tracing::debug!(%layer, "retaining marks of unconfigured layer");
            }
            self.store.restore(&entry.bookmarks, self.config.restore_mode);
        }

        self.ring.select(&self.config.default_layer)?;
        self.state = DocumentState::Loaded;
        self.change_to_layer(host);
        Ok(())
    }

    fn save(&mut self) {
        match self.cache.save(&self.path, &self.store, &self.ring, self.config.span_format()) {
            Ok(outcome) => {
                tracing::debug!(?outcome, "saved bookmarks");
                self.state = DocumentState::Saved;
            }
            Err(err) => tracing::error!(%err, "failed to cache bookmarks"),
        }
    }

    fn on_close(&mut self) {
        if self.config.cache_marks_on_close {
            self.save();
        }

        if self.config.cleanup_empty_cache_on_close && !self.store.has_marks() {
            match self.cache.remove(&self.path) {
                Ok(removed) => tracing::debug!(removed, "cleaned up empty bookmark cache"),
                Err(err) => tracing::error!(%err, "failed to clean up bookmark cache"),
            }
        }

        self.state = DocumentState::Closed;
    }
}
