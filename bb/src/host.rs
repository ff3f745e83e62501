use bb_core::{Direction, Layer, LayerStyle, RegionSet, Span};

/// Key of the status entry that shows the current layer.
pub const STATUS_KEY: &str = "bb_layer_status";

/// The editor side of a document: selections, text and the surfaces bookmarks are shown on.
/// Implemented by the host adapter, the engine never sees editor specific types.
pub trait Host {
    /// The current selections, primary first.
    fn selections(&self) -> Vec<Span>;

    /// The full lines covered by `span`, one span per line.
    fn lines(&self, span: Span) -> Vec<Span>;

    /// The document text covered by `span`.
    fn text(&self, span: Span) -> String;

    /// Draw the marks of the current layer, replacing whatever was drawn before.
    fn render(&mut self, rendered: Rendered<'_>);

    /// Move the cursor to the next or previous mark in `marks`.
    fn navigate(&mut self, direction: Direction, marks: &RegionSet);

    /// Offer the marks of the current layer for the user to pick from.
    fn show_marks(&mut self, items: &[MarkItem]);

    /// Show an error to the user.
    fn error_message(&mut self, message: &str);

    fn status_message(&mut self, _message: &str) {}

    /// Set or, given `None`, erase a permanent status entry.
    fn set_status(&mut self, _key: &str, _text: Option<&str>) {}

    /// Show a popup near the cursor, updating it if it's already visible.
    fn show_popup(&mut self, _text: &str) {}
}

/// The current layer and its marks, as handed to [`Host::render`].
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    pub layer: &'a Layer,
    pub regions: &'a RegionSet,
}

impl Rendered<'_> {
    #[inline]
    pub fn style(&self) -> &LayerStyle {
        self.layer.style()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkItem {
    pub span: Span,
    /// The marked text, or a description of the span if it covers no text.
    pub text: String,
}
