//! Compilation unit: the root of one source file's tree.
//!
//! Owns the node arena, the source text and its [`LineIndex`], the
//! per-unit flags set by passes, and the lazily resolved table of imports
//! the target cannot reference directly. Side tables that must outlive a
//! unit (literal pools, classification registries) live in the translation
//! session and are keyed by [`CompilationUnit::source_file_path`].

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::node::{NodeData, UnitNode};
use crate::visitor::{walk, TreeVisitor};
use crate::{LineIndex, NodeArena, NodeId, NodeKind, SlotName, Span, TreeError, ValidationError};

/// Failure to construct a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("compilation unit `{path}` has an empty main type name")]
    EmptyMainTypeName { path: String },
    #[error("source of `{path}` is {len} bytes, more than offsets can address")]
    SourceTooLarge { path: String, len: usize },
}

/// Answers whether a qualified class name can be referenced directly by the
/// translated code.
pub trait ImportOracle {
    fn can_import_class(&self, qualified_name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> ImportOracle for F {
    fn can_import_class(&self, qualified_name: &str) -> bool {
        self(qualified_name)
    }
}

/// Root node of a translated source file.
#[derive(Debug)]
pub struct CompilationUnit {
    source_file_path: String,
    main_type_name: String,
    source: String,
    lines: LineIndex,
    tree: NodeArena,
    root: NodeId,
    has_incomplete_protocol: bool,
    has_incomplete_implementation: bool,
    has_nullability_annotations: bool,
    unreachable_imports: Option<FxHashMap<String, String>>,
}

impl CompilationUnit {
    /// Create the unit for one source file.
    ///
    /// The path, main type name and source never change afterwards.
    pub fn new(
        source_file_path: impl Into<String>,
        main_type_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, UnitError> {
        let source_file_path = source_file_path.into();
        let main_type_name = main_type_name.into();
        let source = source.into();
        if main_type_name.is_empty() {
            return Err(UnitError::EmptyMainTypeName {
                path: source_file_path,
            });
        }
        if u32::try_from(source.len()).is_err() {
            return Err(UnitError::SourceTooLarge {
                len: source.len(),
                path: source_file_path,
            });
        }
        let lines = LineIndex::build(&source);
        let mut tree = NodeArena::new();
        let root = tree.alloc(NodeData::CompilationUnit(UnitNode::default()), Span::DUMMY);
        Ok(CompilationUnit {
            source_file_path,
            main_type_name,
            source,
            lines,
            tree,
            root,
            has_incomplete_protocol: false,
            has_incomplete_implementation: false,
            has_nullability_annotations: false,
            unreachable_imports: None,
        })
    }

    /// A unit with no backing file: empty path and source.
    pub fn synthetic(main_type_name: impl Into<String>) -> Result<Self, UnitError> {
        Self::new("", main_type_name, "")
    }

    /// Fork this unit.
    ///
    /// Identity, flags and resolved imports are copied verbatim; every
    /// child slot is deep-copied into a fresh arena. Only nodes reachable
    /// from the root are carried over.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.source_file_path))]
    pub fn copy(&self) -> Result<CompilationUnit, TreeError> {
        let mut tree = NodeArena::new();
        let root = tree.alloc(NodeData::CompilationUnit(UnitNode::default()), Span::DUMMY);
        let mut copy = CompilationUnit {
            source_file_path: self.source_file_path.clone(),
            main_type_name: self.main_type_name.clone(),
            source: self.source.clone(),
            lines: self.lines.clone(),
            tree,
            root,
            has_incomplete_protocol: self.has_incomplete_protocol,
            has_incomplete_implementation: self.has_incomplete_implementation,
            has_nullability_annotations: self.has_nullability_annotations,
            unreachable_imports: self.unreachable_imports.clone(),
        };
        for slot in [
            SlotName::Package,
            SlotName::Comments,
            SlotName::NativeBlocks,
            SlotName::Types,
        ] {
            let sources = self.tree.slot_children(self.root, slot)?;
            copy.tree.copy_from(root, slot, &self.tree, sources)?;
        }
        debug!(nodes = copy.tree.len(), "copied compilation unit");
        Ok(copy)
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        NodeKind::CompilationUnit
    }

    /// Id of the root node in [`tree`](Self::tree).
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn tree(&self) -> &NodeArena {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut NodeArena {
        &mut self.tree
    }

    pub fn source_file_path(&self) -> &str {
        &self.source_file_path
    }

    pub fn main_type_name(&self) -> &str {
        &self.main_type_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    pub fn has_incomplete_protocol(&self) -> bool {
        self.has_incomplete_protocol
    }

    pub fn set_has_incomplete_protocol(&mut self) {
        self.has_incomplete_protocol = true;
    }

    pub fn has_incomplete_implementation(&self) -> bool {
        self.has_incomplete_implementation
    }

    pub fn set_has_incomplete_implementation(&mut self) {
        self.has_incomplete_implementation = true;
    }

    pub fn has_nullability_annotations(&self) -> bool {
        self.has_nullability_annotations
    }

    pub fn set_has_nullability_annotations(&mut self) {
        self.has_nullability_annotations = true;
    }

    fn slot(&self, slot: SlotName) -> &[NodeId] {
        self.tree.slot_children(self.root, slot).unwrap_or_default()
    }

    pub fn package(&self) -> Option<NodeId> {
        self.slot(SlotName::Package).first().copied()
    }

    /// Set the package declaration, returning the detached previous one.
    pub fn set_package(&mut self, package: Option<NodeId>) -> Result<Option<NodeId>, TreeError> {
        self.tree.set_child(self.root, SlotName::Package, package)
    }

    pub fn comments(&self) -> &[NodeId] {
        self.slot(SlotName::Comments)
    }

    pub fn native_blocks(&self) -> &[NodeId] {
        self.slot(SlotName::NativeBlocks)
    }

    pub fn types(&self) -> &[NodeId] {
        self.slot(SlotName::Types)
    }

    pub fn add_comment(&mut self, comment: NodeId) -> Result<&mut Self, TreeError> {
        self.tree.push_child(self.root, SlotName::Comments, comment)?;
        Ok(self)
    }

    pub fn add_native_block(&mut self, block: NodeId) -> Result<&mut Self, TreeError> {
        self.tree.push_child(self.root, SlotName::NativeBlocks, block)?;
        Ok(self)
    }

    pub fn add_type(&mut self, ty: NodeId) -> Result<&mut Self, TreeError> {
        self.tree.push_child(self.root, SlotName::Types, ty)?;
        Ok(self)
    }

    pub fn insert_type(&mut self, index: usize, ty: NodeId) -> Result<&mut Self, TreeError> {
        self.tree.insert_child(self.root, SlotName::Types, index, ty)?;
        Ok(self)
    }

    /// 1-based line of a byte offset, `None` if outside the source.
    pub fn line_number(&self, offset: u32) -> Option<u32> {
        self.lines.line_number(offset)
    }

    pub fn line_number_for(&self, span: Span) -> Option<u32> {
        self.lines.line_number_for(span)
    }

    /// 1-based line on which a node starts.
    pub fn line_number_of(&self, id: NodeId) -> Option<u32> {
        self.tree
            .span(id)
            .and_then(|span| self.lines.line_number_for(span))
    }

    /// Source text under a node's span, e.g. the text of a comment.
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        let span = self.tree.span(id)?;
        self.source.get(span.to_range())
    }

    /// Run `visitor` over the whole tree.
    pub fn accept<V: TreeVisitor + ?Sized>(&mut self, visitor: &mut V) {
        let root = self.root;
        walk(visitor, self, root);
    }

    /// Run `visitor` over the subtree rooted at `id`.
    pub fn accept_node<V: TreeVisitor + ?Sized>(&mut self, id: NodeId, visitor: &mut V) {
        walk(visitor, self, id);
    }

    /// Check the unit's structural invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.main_type_name.is_empty() {
            return Err(ValidationError::EmptyMainTypeName);
        }
        if self.package().is_none() {
            return Err(ValidationError::MissingPackage {
                path: self.source_file_path.clone(),
            });
        }
        self.tree.validate_subtree(self.root)
    }

    /// Record which imports the target cannot reference directly.
    ///
    /// Each rejected import maps its simple name to its qualified name.
    /// On-demand imports (`a.b.*`) name no single class and are skipped.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.source_file_path))]
    pub fn resolve_unreachable_imports<'a, I, O>(
        &mut self,
        imports: I,
        oracle: &O,
    ) -> &FxHashMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
        O: ImportOracle + ?Sized,
    {
        let mut map = FxHashMap::default();
        for qualified in imports {
            if qualified.ends_with(".*") || oracle.can_import_class(qualified) {
                continue;
            }
            let simple = qualified.rsplit('.').next().unwrap_or(qualified);
            debug!(import = qualified, "unreachable import");
            map.insert(simple.to_owned(), qualified.to_owned());
        }
        self.unreachable_imports.insert(map)
    }

    /// Imports resolved by [`resolve_unreachable_imports`](Self::resolve_unreachable_imports),
    /// `None` until it has run.
    pub fn unreachable_imports(&self) -> Option<&FxHashMap<String, String>> {
        self.unreachable_imports.as_ref()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
