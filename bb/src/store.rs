use bb_core::{LayerName, LayerRing, RegionSet, Span};
use rustc_hash::FxHashMap;

use crate::cache::{Bookmarks, SpanFormat};
use crate::settings::RestoreMode;

/// The marks of one document, per layer.
///
/// Layers that are not (or no longer) configured may still hold marks, for instance ones restored
/// from the cache after a layer was removed from the settings. Those are kept and persisted but
/// don't count towards [`BookmarkStore::is_empty`].
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    layers: FxHashMap<LayerName, RegionSet>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions_for(&mut self, layer: &str) -> &mut RegionSet {
        self.layers.entry(LayerName::from(layer)).or_default()
    }

    pub fn regions(&self, layer: &str) -> Option<&RegionSet> {
        self.layers.get(layer)
    }

    pub fn toggle(&mut self, layer: &str, spans: impl IntoIterator<Item = Span>) {
        self.regions_for(layer).toggle(spans)
    }

    /// Whether no layer of the ring has any marks.
    pub fn is_empty(&self, ring: &LayerRing) -> bool {
        ring.names().all(|name| self.regions(name).map_or(true, RegionSet::is_empty))
    }

    /// Whether any layer holds marks, including layers that are no longer configured.
    pub fn has_marks(&self) -> bool {
        self.layers.values().any(|regions| !regions.is_empty())
    }

    pub fn clear_layer(&mut self, layer: &str) {
        if let Some(regions) = self.layers.get_mut(layer) {
            regions.clear();
        }
    }

    pub fn clear_all(&mut self) {
        self.layers.values_mut().for_each(RegionSet::clear);
    }

    /// Apply cached marks. Layers absent from `bookmarks` are left alone.
    pub fn restore(&mut self, bookmarks: &Bookmarks, mode: RestoreMode) {
        for (layer, spans) in bookmarks.iter() {
            let regions = self.regions_for(layer);
            match mode {
                RestoreMode::Overwrite => *regions = spans.iter().copied().collect(),
                RestoreMode::Union => regions.extend(spans.iter().copied()),
                RestoreMode::Toggle => regions.toggle(spans.iter().copied()),
            }
        }
    }

    /// The marks to persist: every layer of the ring in ring order, followed by any other layer
    /// that still has marks.
    pub fn snapshot(&self, ring: &LayerRing, format: SpanFormat) -> Bookmarks {
        let spans = |regions: &RegionSet| -> Vec<Span> {
            regions.iter().map(|span| format.apply(span)).collect()
        };

        let mut bookmarks = Bookmarks::new();
        for name in ring.names() {
            bookmarks.insert(name.clone(), self.regions(name).map(spans).unwrap_or_default());
        }

        let mut retained = self
            .layers
            .iter()
            .filter(|(name, regions)| !ring.contains(name) && !regions.is_empty())
            .collect::<Vec<_>>();
        // hash map order isn't stable across runs
        retained.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (name, regions) in retained {
            bookmarks.insert(name.clone(), spans(regions));
        }

        bookmarks
    }
}
