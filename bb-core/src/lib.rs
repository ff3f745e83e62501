//! Data primitives for layered bookmarks: spans, the region sets they are marked in, and the ring
//! of layers that decides where new marks go.

mod error;
mod layer;
mod region;
mod span;

pub use self::error::ConfigError;
pub use self::layer::{Direction, Layer, LayerName, LayerRing, LayerStyle};
pub use self::region::RegionSet;
pub use self::span::Span;
