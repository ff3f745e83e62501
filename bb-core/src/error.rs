use std::error::Error;
use std::fmt;

use crate::LayerName;

/// An invalid setting or command argument. These are meant to be shown to the user and abort the
/// operation that encountered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoLayers,
    DuplicateLayer(LayerName),
    UnknownDefaultLayer(LayerName),
    UnknownLayer(LayerName),
    InvalidDirection(String),
    /// From parsing a `MarkingMode` directly. In a settings document it is reported inside
    /// [`ConfigError::Settings`], along with the position of the bad value.
    InvalidMarkingMode(String),
    InvalidCommand(String),
    /// Settings that don't deserialize, with the deserializer's message.
    Settings(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoLayers => write!(f, "invalid setting: `layer_icons` must define a layer"),
            ConfigError::DuplicateLayer(name) => {
                write!(f, "invalid setting: layer `{name}` is defined more than once")
            }
            ConfigError::UnknownDefaultLayer(name) => {
                write!(f, "invalid setting: `default_layer` `{name}` is not one of `layer_icons`")
            }
            ConfigError::UnknownLayer(name) => write!(f, "unknown bookmark layer `{name}`"),
            ConfigError::InvalidDirection(direction) => {
                write!(f, "invalid direction `{direction}` (expected `next` or `prev`)")
            }
            ConfigError::InvalidMarkingMode(mode) => {
                write!(f, "invalid marking mode `{mode}` (expected `line` or `selection`)")
            }
            ConfigError::InvalidCommand(msg) => write!(f, "invalid bookmark command: {msg}"),
            ConfigError::Settings(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl Error for ConfigError {}
