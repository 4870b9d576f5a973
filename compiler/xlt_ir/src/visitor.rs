//! Tree visitor.
//!
//! Depth-first, pre-order `visit_*` then post-order `end_visit_*`:
//!
//! - a `visit_*` hook returning `false` prunes the node's children, its
//!   `end_visit_*` hook still runs
//! - children are walked slot by slot in declaration order (package,
//!   comments, native blocks, types for a unit; members for a type)
//! - hooks get `&mut CompilationUnit`, so rewrite passes can mutate the
//!   tree in place
//!
//! The walker snapshots a node's children before calling its `visit_*`
//! hook. When a child's turn comes it is skipped if it no longer belongs to
//! that node, and nodes attached during the walk are not visited. A pass that
//! wants to walk a replacement calls [`walk`] on it explicitly.
//!
//! Per-kind hooks default to the generic [`TreeVisitor::visit_node`] and
//! [`TreeVisitor::end_visit_node`], so a pass overrides only what it needs.
//!
//! # Example
//!
//! ```text
//! struct CountMethods {
//!     count: usize,
//! }
//!
//! impl TreeVisitor for CountMethods {
//!     fn visit_method_declaration(&mut self, _: &mut CompilationUnit, _: NodeId) -> bool {
//!         self.count += 1;
//!         false
//!     }
//! }
//! ```

use crate::{CompilationUnit, NodeId, NodeKind};

/// A pass over a compilation unit's tree.
#[allow(unused_variables, reason = "default hooks ignore their arguments")]
pub trait TreeVisitor {
    /// Generic pre-order hook. Return `false` to skip the node's children.
    fn visit_node(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        true
    }

    /// Generic post-order hook.
    fn end_visit_node(&mut self, unit: &mut CompilationUnit, id: NodeId) {}

    fn visit_compilation_unit(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_compilation_unit(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_package_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_package_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_comment(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_comment(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_native_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_native_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_type_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_type_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_method_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_method_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }

    fn visit_field_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) -> bool {
        self.visit_node(unit, id)
    }

    fn end_visit_field_declaration(&mut self, unit: &mut CompilationUnit, id: NodeId) {
        self.end_visit_node(unit, id);
    }
}

/// Walk the subtree rooted at `id`. Unknown ids are ignored.
pub fn walk<V: TreeVisitor + ?Sized>(visitor: &mut V, unit: &mut CompilationUnit, id: NodeId) {
    let Some(kind) = unit.tree().kind(id) else {
        return;
    };
    let children = unit.tree().children(id);
    if dispatch_visit(visitor, unit, kind, id) {
        for child in children {
            let still_owned = unit
                .tree()
                .parent(child)
                .is_some_and(|link| link.owner == id);
            if still_owned {
                walk(visitor, unit, child);
            }
        }
    }
    dispatch_end_visit(visitor, unit, kind, id);
}

fn dispatch_visit<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    unit: &mut CompilationUnit,
    kind: NodeKind,
    id: NodeId,
) -> bool {
    match kind {
        NodeKind::CompilationUnit => visitor.visit_compilation_unit(unit, id),
        NodeKind::PackageDeclaration => visitor.visit_package_declaration(unit, id),
        NodeKind::Comment => visitor.visit_comment(unit, id),
        NodeKind::NativeDeclaration => visitor.visit_native_declaration(unit, id),
        NodeKind::TypeDeclaration => visitor.visit_type_declaration(unit, id),
        NodeKind::MethodDeclaration => visitor.visit_method_declaration(unit, id),
        NodeKind::FieldDeclaration => visitor.visit_field_declaration(unit, id),
    }
}

fn dispatch_end_visit<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    unit: &mut CompilationUnit,
    kind: NodeKind,
    id: NodeId,
) {
    match kind {
        NodeKind::CompilationUnit => visitor.end_visit_compilation_unit(unit, id),
        NodeKind::PackageDeclaration => visitor.end_visit_package_declaration(unit, id),
        NodeKind::Comment => visitor.end_visit_comment(unit, id),
        NodeKind::NativeDeclaration => visitor.end_visit_native_declaration(unit, id),
        NodeKind::TypeDeclaration => visitor.end_visit_type_declaration(unit, id),
        NodeKind::MethodDeclaration => visitor.end_visit_method_declaration(unit, id),
        NodeKind::FieldDeclaration => visitor.end_visit_field_declaration(unit, id),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
