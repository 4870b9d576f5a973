//! xlt IR - Tree Infrastructure
//!
//! The backbone every translation pass works on:
//! - Spans and the per-unit line index for source positions
//! - `NodeArena` holding the nodes of one compilation unit
//! - Typed child slots (`ChildLink`, `ChildList`) with parent backlinks
//! - The `CompilationUnit` root and its per-file metadata
//! - A depth-first `TreeVisitor`, deep copy and structural validation
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes live in an arena, children and parents
//!   are `NodeId(u32)` handles, never owning pointers
//! - **Single Owner**: a node sits in at most one slot; the arena keeps the
//!   slot and the child's `ParentLink` in sync
//! - **Closed Kinds**: `NodeKind` and `NodeData` are matched exhaustively
//!
//! Nothing here is shared between units. Process-wide tables (literal pools,
//! test-case registries) belong to the translation session.

mod arena;
mod kind;
mod line_index;
pub mod node;
mod node_id;
mod slot;
mod span;
mod unit;
mod validate;
pub mod visitor;

pub use arena::{Node, NodeArena, ParentLink, TreeError};
pub use kind::{NodeKind, SlotName};
pub use line_index::LineIndex;
pub use node::{
    Comment, CommentKind, FieldDeclaration, MethodDeclaration, NativeDeclaration, NodeData,
    PackageDeclaration, TypeDeclKind, TypeDeclaration, TypeIdentity, UnitNode,
};
pub use node_id::NodeId;
pub use slot::{BodyDeclaration, ChildLink, ChildList, SlotType};
pub use span::Span;
pub use unit::{CompilationUnit, ImportOracle, UnitError};
pub use validate::ValidationError;
pub use visitor::{walk, TreeVisitor};
