use std::fmt;
use std::ops::Range;

/// A pair of character offsets into a document.
///
/// The endpoints are kept in the order they were given so a selection made "backwards" can be
/// persisted as such. Equality compares the raw pair, use [`Span::normalize`] to compare extents.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    anchor: usize,
    head: usize,
}

impl Span {
    #[inline]
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    #[inline]
    pub const fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    #[inline]
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// The smaller endpoint.
    #[inline]
    pub fn begin(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// The larger endpoint.
    #[inline]
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end() - self.begin()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.anchor > self.head
    }

    #[inline]
    pub fn normalize(self) -> Self {
        Self::new(self.begin(), self.end())
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.begin()..self.end()
    }
}

impl From<Range<usize>> for Span {
    #[inline]
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end).normalize()
    }
}

impl From<[usize; 2]> for Span {
    #[inline]
    fn from([anchor, head]: [usize; 2]) -> Self {
        Span::new(anchor, head)
    }
}

impl From<Span> for [usize; 2] {
    #[inline]
    fn from(span: Span) -> Self {
        [span.anchor, span.head]
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.anchor, self.head)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.anchor, self.head)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Span {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        <[usize; 2]>::from(*self).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Span {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[usize; 2]>::deserialize(deserializer).map(Span::from)
    }
}
