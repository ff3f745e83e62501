use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::ConfigError;

pub type LayerName = SmolStr;

/// How the host should draw the marks of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerStyle {
    /// Gutter icon name or resource path.
    #[cfg_attr(feature = "serde", serde(default))]
    pub icon: String,
    /// Scope used to color the marks.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scope: String,
}

impl LayerStyle {
    pub fn new(icon: impl Into<String>, scope: impl Into<String>) -> Self {
        Self { icon: icon.into(), scope: scope.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: LayerName,
    style: LayerStyle,
}

impl Layer {
    pub fn new(name: impl Into<LayerName>, style: LayerStyle) -> Self {
        Self { name: name.into(), style }
    }

    #[inline]
    pub fn name(&self) -> &LayerName {
        &self.name
    }

    #[inline]
    pub fn style(&self) -> &LayerStyle {
        &self.style
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(try_from = "String"))]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Prev => "prev",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" | "forward" => Ok(Direction::Next),
            "prev" | "previous" | "backward" => Ok(Direction::Prev),
            _ => Err(ConfigError::InvalidDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The configured layers in order, with a circular pointer to the current one.
#[derive(Clone, PartialEq, Eq)]
pub struct LayerRing {
    layers: Box<[Layer]>,
    current: usize,
}

impl LayerRing {
    /// Build the ring and make `default` the current layer.
    pub fn new(
        layers: impl IntoIterator<Item = Layer>,
        default: &str,
    ) -> Result<Self, ConfigError> {
        let mut ring = Self { layers: Self::validate(layers)?, current: 0 };
        ring.select(default).map_err(|_| ConfigError::UnknownDefaultLayer(default.into()))?;
        Ok(ring)
    }

    fn validate(layers: impl IntoIterator<Item = Layer>) -> Result<Box<[Layer]>, ConfigError> {
        let layers = layers.into_iter().collect::<Box<[_]>>();
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }

        for (i, layer) in layers.iter().enumerate() {
            if layers[..i].iter().any(|l| l.name == layer.name) {
                return Err(ConfigError::DuplicateLayer(layer.name.clone()));
            }
        }

        Ok(layers)
    }

    /// Replace the layers. The current layer becomes the first configured layer, the previous
    /// current layer is not carried over. On error the ring is left untouched.
    pub fn reconfigure(&mut self, layers: impl IntoIterator<Item = Layer>) -> Result<(), ConfigError> {
        self.layers = Self::validate(layers)?;
        self.current = 0;
        Ok(())
    }

    #[inline]
    pub fn current(&self) -> &Layer {
        &self.layers[self.current]
    }

    #[inline]
    pub fn current_name(&self) -> &LayerName {
        self.current().name()
    }

    /// Move the current pointer one step, wrapping around at either end.
    pub fn rotate(&mut self, direction: Direction) -> &Layer {
        let n = self.layers.len();
        self.current = match direction {
            Direction::Next => (self.current + 1) % n,
            Direction::Prev => (self.current + n - 1) % n,
        };
        self.current()
    }

    /// Make the named layer current.
    pub fn select(&mut self, name: &str) -> Result<&Layer, ConfigError> {
        let idx = self
            .layers
            .iter()
            .position(|layer| layer.name == name)
            .ok_or_else(|| ConfigError::UnknownLayer(name.into()))?;
        self.current = idx;
        Ok(self.current())
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The layers in configured order, regardless of rotation.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &LayerName> {
        self.iter().map(Layer::name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// A ring always holds at least one layer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for LayerRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            if i == self.current {
                write!(f, "[{}]", layer.name)?;
            } else {
                write!(f, "{}", layer.name)?;
            }
        }
        Ok(())
    }
}
