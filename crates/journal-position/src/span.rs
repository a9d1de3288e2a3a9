//! Byte-offset spans over journal source text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as StdRange;

/// A half-open `[start, end)` byte range in one source file.
///
/// Spans use byte offsets, not characters: they are what the lexer and
/// parser produce and what [`LineIndex`](crate::LineIndex) converts into
/// editor positions. `start <= end` is required by every constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a span covering `start..end`.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `start > end`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span: start ({start}) > end ({end})");
        Self { start, end }
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub const fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Length in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if `start == end`.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the span contains the byte offset (end-exclusive).
    #[inline]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn cover(&self, other: Span) -> Span {
        Span { start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    /// The slice of `source` this span covers, or `None` if out of bounds.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<StdRange<usize>> for Span {
    #[inline]
    fn from(range: StdRange<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for StdRange<usize> {
    #[inline]
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::empty(3).is_empty());
    }

    #[test]
    fn contains_is_end_exclusive() {
        let span = Span::new(5, 10);
        assert!(!span.contains(4));
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10));
    }

    #[test]
    fn cover_spans_both() {
        assert_eq!(Span::new(0, 4).cover(Span::new(2, 9)), Span::new(0, 9));
        assert_eq!(Span::new(6, 8).cover(Span::new(1, 2)), Span::new(1, 8));
    }

    #[test]
    fn slice_checks_bounds() {
        let src = "2024-01-15 groceries";
        assert_eq!(Span::new(0, 10).slice(src), Some("2024-01-15"));
        assert_eq!(Span::new(11, 99).slice(src), None);
    }

    #[test]
    fn range_conversions() {
        let span: Span = (3..7).into();
        assert_eq!(span, Span::new(3, 7));
        let range: StdRange<usize> = span.into();
        assert_eq!(range, 3..7);
    }
}
