use std::fmt;

use crate::Span;

/// The spans marked under one layer of one document, in the order they were marked.
/// A span occurs at most once.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    // Bookmarks are few per layer, a linear scan is fine.
    spans: Vec<Span>,
}

impl RegionSet {
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// For each span, in order: remove it if it is already marked, otherwise mark it.
    /// Marking the same span twice is how a bookmark is removed.
    pub fn toggle(&mut self, spans: impl IntoIterator<Item = Span>) {
        for span in spans {
            if !self.remove(span) {
                self.spans.push(span);
            }
        }
        debug_assert!(self.invariants());
    }

    /// Mark the span unless it is already marked. Returns whether it was added.
    pub fn insert(&mut self, span: Span) -> bool {
        if self.contains(span) {
            return false;
        }
        self.spans.push(span);
        true
    }

    /// Returns whether the span was present.
    pub fn remove(&mut self, span: Span) -> bool {
        match self.spans.iter().position(|&s| s == span) {
            Some(idx) => {
                self.spans.remove(idx);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, span: Span) -> bool {
        self.spans.contains(&span)
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Span> + '_ {
        self.spans.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    fn invariants(&self) -> bool {
        self.spans.iter().enumerate().all(|(i, span)| !self.spans[i + 1..].contains(span))
    }
}

/// Collects with set semantics: later duplicates are dropped rather than cancelling earlier ones.
impl FromIterator<Span> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut set = RegionSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Span> for RegionSet {
    fn extend<I: IntoIterator<Item = Span>>(&mut self, iter: I) {
        for span in iter {
            self.insert(span);
        }
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = Span;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Span>>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter().copied()
    }
}

impl fmt::Debug for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.spans).finish()
    }
}
