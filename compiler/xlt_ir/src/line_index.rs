//! Offset-to-line lookup for a unit's source text.
//!
//! Built once per compilation unit: one O(n) scan records the start offset
//! of every line, then each query is an O(log L) binary search.

use crate::Span;

/// Pre-computed line start offsets.
///
/// ```
/// use xlt_ir::LineIndex;
///
/// let index = LineIndex::build("a\nbb\n");
/// assert_eq!(index.line_number(0), Some(1));
/// assert_eq!(index.line_number(2), Some(2));
/// assert_eq!(index.line_number(5), None); // past the end
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of each line start.
    /// offsets[0] = 0, offsets[n] = byte after the n-th `\n`.
    /// Empty for empty source.
    offsets: Vec<u32>,
    source_len: u32,
}

impl LineIndex {
    /// Build the index from source text.
    ///
    /// Offsets are byte offsets; sources longer than `u32::MAX` bytes are
    /// rejected by [`CompilationUnit::new`](crate::CompilationUnit::new)
    /// before getting here.
    pub fn build(source: &str) -> Self {
        let source_len = u32::try_from(source.len()).unwrap_or(u32::MAX);
        if source.is_empty() {
            return LineIndex {
                offsets: Vec::new(),
                source_len,
            };
        }
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex {
            offsets,
            source_len,
        }
    }

    /// 1-based line containing `offset`, or `None` when the offset is not
    /// inside the source.
    pub fn line_number(&self, offset: u32) -> Option<u32> {
        if offset >= self.source_len {
            return None;
        }
        // Largest line start <= offset; offsets[0] == 0 so insert >= 1.
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        u32::try_from(line_idx + 1).ok()
    }

    /// Line of the first byte of `span`.
    pub fn line_number_for(&self, span: Span) -> Option<u32> {
        self.line_number(span.start)
    }

    /// 1-based (line, column) for `offset`; the column counts characters.
    pub fn line_col(&self, source: &str, offset: u32) -> Option<(u32, u32)> {
        let line = self.line_number(offset)?;
        let line_start = self.line_start(line)? as usize;
        let text = source.get(line_start..offset as usize)?;
        let col = u32::try_from(text.chars().count()).unwrap_or(u32::MAX - 1) + 1;
        Some((line, col))
    }

    /// Byte offset at which a 1-based line starts.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    /// Number of recorded line starts. Zero for empty source.
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests;
