use std::fmt;
use std::str::FromStr;

use bb_core::{ConfigError, Layer, LayerName, LayerRing, LayerStyle};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::cache::SpanFormat;

/// User settings, shared by every open document.
///
/// Deserialized from the host's settings object; unknown keys are ignored and missing keys take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The layers in ring order, each with the style its marks are drawn with.
    #[serde(deserialize_with = "deserialize_layers")]
    pub layer_icons: Vec<Layer>,
    /// The layer that is current when a document is loaded.
    pub default_layer: LayerName,
    /// What an unqualified `mark_line` marks.
    pub marking_mode: MarkingMode,
    /// Persist spans with ordered endpoints, dropping the cursor's side of each selection.
    pub ignore_cursor: bool,
    #[serde(deserialize_with = "deserialize_status_locations")]
    pub layer_status_location: StatusLocations,
    pub uncache_marks_on_load: bool,
    pub cache_marks_on_save: bool,
    pub cache_marks_on_close: bool,
    pub cleanup_empty_cache_on_close: bool,
    /// How cached marks are applied to a document's layers on load.
    pub restore_mode: RestoreMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layer_icons: vec![
                Layer::new("bookmarks", LayerStyle::new("bookmark", "string")),
                Layer::new("todo", LayerStyle::new("dot", "comment")),
                Layer::new("flagged", LayerStyle::new("circle", "markup.changed")),
                Layer::new("done", LayerStyle::new("circle", "markup.inserted")),
            ],
            default_layer: "bookmarks".into(),
            marking_mode: MarkingMode::default(),
            ignore_cursor: true,
            layer_status_location: StatusLocations::PERMANENT,
            uncache_marks_on_load: false,
            cache_marks_on_save: false,
            cache_marks_on_close: false,
            cleanup_empty_cache_on_close: false,
            restore_mode: RestoreMode::default(),
        }
    }
}

impl Config {
    /// Parse and validate settings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Config>(json)
            .map_err(|err| ConfigError::Settings(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layer_ring().map(drop)
    }

    /// A fresh ring of the configured layers, starting at the default layer.
    pub fn layer_ring(&self) -> Result<LayerRing, ConfigError> {
        LayerRing::new(self.layer_icons.iter().cloned(), &self.default_layer)
    }

    pub fn span_format(&self) -> SpanFormat {
        if self.ignore_cursor { SpanFormat::Normalized } else { SpanFormat::Raw }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum MarkingMode {
    /// Mark every full line touched by the primary selection.
    Line,
    /// Mark each selection as is.
    #[default]
    Selection,
}

impl FromStr for MarkingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(MarkingMode::Line),
            "selection" => Ok(MarkingMode::Selection),
            _ => Err(ConfigError::InvalidMarkingMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for MarkingMode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// How a cache entry is applied to the layers of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreMode {
    /// Replace each cached layer's marks.
    #[default]
    Overwrite,
    /// Add cached marks that are missing.
    Union,
    /// Toggle cached marks like interactive marking does, so restoring onto a populated layer
    /// removes the marks it has in common with the cache.
    Toggle,
}

bitflags::bitflags! {
    /// The status surfaces that show the current layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusLocations: u8 {
        /// A transient status bar message.
        const TEMPORARY = 1 << 0;
        /// A status bar entry that stays until the layer changes.
        const PERMANENT = 1 << 1;
        const POPUP = 1 << 2;
    }
}

impl StatusLocations {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "temporary" => Ok(StatusLocations::TEMPORARY),
            "permanent" => Ok(StatusLocations::PERMANENT),
            "popup" => Ok(StatusLocations::POPUP),
            _ => Err(format!(
                "invalid layer status location `{s}` (expected `temporary`, `permanent` or `popup`)"
            )),
        }
    }
}

fn deserialize_status_locations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<StatusLocations, D::Error> {
    struct LocationsVisitor;

    impl<'de> Visitor<'de> for LocationsVisitor {
        type Value = StatusLocations;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a list of status locations")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut locations = StatusLocations::empty();
            while let Some(location) = seq.next_element::<String>()? {
                locations |= StatusLocations::parse(&location).map_err(de::Error::custom)?;
            }
            Ok(locations)
        }
    }

    deserializer.deserialize_seq(LocationsVisitor)
}

/// `layer_icons` is a JSON object whose key order is the ring order, so it can't go through a
/// hash map.
fn deserialize_layers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Layer>, D::Error> {
    struct LayersVisitor;

    impl<'de> Visitor<'de> for LayersVisitor {
        type Value = Vec<Layer>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a map of layer names to `{{ icon, scope }}`")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut layers = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, style)) = map.next_entry::<LayerName, LayerStyle>()? {
                layers.push(Layer::new(name, style));
            }
            Ok(layers)
        }
    }

    deserializer.deserialize_map(LayersVisitor)
}
