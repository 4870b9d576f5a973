//! Per-file string literal pools.
//!
//! Every source file gets its own pool. The first distinct literal of a
//! file gets id 1, the next distinct one id 2, and so on; interning the same
//! text again returns the id it already has. Emission later materialises a
//! file's pool in id order.
//!
//! Pools are sharded by file path in a `DashMap`, so units translated on
//! different threads never contend unless they share a file, and
//! insert-if-absent within one file is atomic.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use tracing::trace;
use xlt_ir::CompilationUnit;

use crate::escape::TextEscaper;

/// Position of a literal in its file's pool, starting at 1.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct LiteralId(u32);

impl LiteralId {
    /// Id of the first literal of a pool.
    pub const FIRST: LiteralId = LiteralId(1);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        LiteralId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Id for the literal stored at `index` of a pool.
    fn from_index(index: usize) -> Self {
        LiteralId(u32::try_from(index + 1).unwrap_or(u32::MAX))
    }
}

impl fmt::Debug for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LiteralId({})", self.0)
    }
}

impl fmt::Display for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Literals of one file.
#[derive(Default)]
struct FilePool {
    ids: FxHashMap<Arc<str>, LiteralId>,
    /// Texts in id order: `texts[i]` has id `i + 1`.
    texts: Vec<Arc<str>>,
}

impl FilePool {
    fn intern(&mut self, text: &str) -> LiteralId {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = LiteralId::from_index(self.texts.len());
        let text: Arc<str> = Arc::from(text);
        self.ids.insert(Arc::clone(&text), id);
        self.texts.push(text);
        id
    }
}

/// String literal pools for every file of a translation run.
///
/// Never shrinks during a run.
#[derive(Default)]
pub struct LiteralPool {
    files: DashMap<String, FilePool>,
}

impl LiteralPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `text` in the pool of `file`, interning it if absent.
    pub fn intern(&self, file: &str, text: &str) -> LiteralId {
        // Fast path: read lock on the file's shard only.
        if let Some(id) = self.lookup(file, text) {
            return id;
        }
        let id = self.files.entry(file.to_owned()).or_default().intern(text);
        trace!(file, id = id.raw(), "interned literal");
        id
    }

    /// Id of `text` if it was interned for `file`.
    pub fn lookup(&self, file: &str, text: &str) -> Option<LiteralId> {
        self.files
            .get(file)
            .and_then(|pool| pool.ids.get(text).copied())
    }

    /// Literals of `file` in id order, `None` if the file has none.
    pub fn literals(&self, file: &str) -> Option<Vec<String>> {
        self.files
            .get(file)
            .map(|pool| pool.texts.iter().map(ToString::to_string).collect())
    }

    /// Number of literals interned for `file`.
    pub fn len(&self, file: &str) -> usize {
        self.files.get(file).map_or(0, |pool| pool.texts.len())
    }

    /// Number of files with at least one literal.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Debug for LiteralPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteralPool")
            .field("files", &self.files.len())
            .finish()
    }
}

/// Text of a rendered literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralText {
    /// Escaped body, ready to go between double quotes.
    Escaped(String),
    /// The text holds characters that cannot be emitted inline; emission
    /// fills it in from the pool.
    Placeholder,
}

/// A string constant as emitted: `JreString(<id>, "<text>")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLiteral {
    pub id: LiteralId,
    pub text: LiteralText,
}

impl fmt::Display for RenderedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            LiteralText::Escaped(text) => write!(f, "JreString({}, \"{text}\")", self.id),
            LiteralText::Placeholder => write!(f, "JreString({}, __)", self.id),
        }
    }
}

/// Literal interning for the file a unit was parsed from.
pub trait UnitLiterals {
    /// Intern `text` in this unit's file pool and render the constant.
    fn string_constant<E: TextEscaper + ?Sized>(
        &self,
        pool: &LiteralPool,
        text: &str,
        escaper: &E,
    ) -> RenderedLiteral;
}

impl UnitLiterals for CompilationUnit {
    fn string_constant<E: TextEscaper + ?Sized>(
        &self,
        pool: &LiteralPool,
        text: &str,
        escaper: &E,
    ) -> RenderedLiteral {
        let id = pool.intern(self.source_file_path(), text);
        let text = if escaper.has_valid_cpp_characters(text) {
            LiteralText::Escaped(escaper.escape_string_literal(text))
        } else {
            LiteralText::Placeholder
        };
        RenderedLiteral { id, text }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
