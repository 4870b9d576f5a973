//! Node kind tags and slot names.
//!
//! Both sets are closed. Traversal, copying and validation `match` over them
//! exhaustively, so adding a node kind fails to build until every pass
//! handles it.

use std::fmt;

/// Tag identifying the concrete variant of a tree node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    CompilationUnit,
    PackageDeclaration,
    Comment,
    NativeDeclaration,
    TypeDeclaration,
    MethodDeclaration,
    FieldDeclaration,
}

impl NodeKind {
    /// Display name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation unit",
            NodeKind::PackageDeclaration => "package declaration",
            NodeKind::Comment => "comment",
            NodeKind::NativeDeclaration => "native declaration",
            NodeKind::TypeDeclaration => "type declaration",
            NodeKind::MethodDeclaration => "method declaration",
            NodeKind::FieldDeclaration => "field declaration",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of a child slot on an owning node.
///
/// A parent link records the owner and the slot, so a node always knows
/// which container holds it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SlotName {
    /// Package declaration of a compilation unit (single child).
    Package,
    /// Comments of a compilation unit.
    Comments,
    /// Native code blocks of a compilation unit.
    NativeBlocks,
    /// Top-level type declarations of a compilation unit.
    Types,
    /// Body declarations of a type declaration.
    Members,
}

impl SlotName {
    pub const fn name(self) -> &'static str {
        match self {
            SlotName::Package => "package",
            SlotName::Comments => "comments",
            SlotName::NativeBlocks => "native_blocks",
            SlotName::Types => "types",
            SlotName::Members => "members",
        }
    }

    /// Whether the slot holds an ordered sequence rather than at most one child.
    pub const fn is_list(self) -> bool {
        !matches!(self, SlotName::Package)
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
