//! Node spans.
//!
//! A span is a byte range into the owning unit's source text.
//! [`CompilationUnit::new`](crate::CompilationUnit::new) refuses sources
//! longer than `u32::MAX` bytes, so every offset of a parsed node fits.

use std::fmt;
use std::ops::Range;

/// Bytes `start..end` of a node's source text.
///
/// Nodes synthesized by rewrite passes carry [`Span::DUMMY`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Range for slicing the unit's source.
    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
