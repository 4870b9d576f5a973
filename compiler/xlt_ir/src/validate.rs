//! Structural validation.
//!
//! A debugging facility run between passes. Any failure means a pass broke
//! the tree; it is an internal fault, never a diagnostic about user source.

use rustc_hash::FxHashSet;

use crate::{NodeArena, NodeId, NodeKind, ParentLink, SlotName};

/// Internal-consistency failure found by validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("compilation unit has an empty main type name")]
    EmptyMainTypeName,
    #[error("compilation unit `{path}` has no package declaration")]
    MissingPackage { path: String },
    #[error("{kind} node {node:?} is missing its {field}")]
    MissingField {
        node: NodeId,
        kind: NodeKind,
        field: &'static str,
    },
    #[error("`{slot}` of {owner:?} refers to unknown node {child:?}")]
    DanglingChild {
        owner: NodeId,
        slot: SlotName,
        child: NodeId,
    },
    #[error("`{slot}` of {owner:?} holds {child:?}, whose parent link is {found:?}")]
    BrokenParentLink {
        owner: NodeId,
        slot: SlotName,
        child: NodeId,
        found: Option<ParentLink>,
    },
    #[error("`{slot}` of {owner:?} cannot hold a {found} node")]
    KindMismatch {
        owner: NodeId,
        slot: SlotName,
        found: NodeKind,
    },
    #[error("node {0:?} is reachable through more than one slot")]
    SharedChild(NodeId),
    #[error("node {child:?} claims `{slot}` of {owner:?} but is not held there")]
    OrphanedChild {
        owner: NodeId,
        slot: SlotName,
        child: NodeId,
    },
}

impl NodeArena {
    /// Validate the subtree rooted at `root`.
    ///
    /// Checks required payload fields, that every child's parent link names
    /// the slot holding it, that slots hold admitted kinds, that no node is
    /// reachable twice, and that no node claims a parent in the subtree
    /// without being held by it.
    pub fn validate_subtree(&self, root: NodeId) -> Result<(), ValidationError> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(ValidationError::SharedChild(id));
            }
            let Some(node) = self.get(id) else {
                continue;
            };
            if let Some(field) = node.data().missing_field() {
                return Err(ValidationError::MissingField {
                    node: id,
                    kind: node.kind(),
                    field,
                });
            }
            for &slot in node.data().slot_names() {
                let children = self.slot_children(id, slot).unwrap_or_default();
                for &child in children {
                    let Some(child_node) = self.get(child) else {
                        return Err(ValidationError::DanglingChild {
                            owner: id,
                            slot,
                            child,
                        });
                    };
                    let expected = ParentLink { owner: id, slot };
                    if child_node.parent() != Some(expected) {
                        return Err(ValidationError::BrokenParentLink {
                            owner: id,
                            slot,
                            child,
                            found: child_node.parent(),
                        });
                    }
                    if !self.slot_admits(id, slot, child_node.kind()) {
                        return Err(ValidationError::KindMismatch {
                            owner: id,
                            slot,
                            found: child_node.kind(),
                        });
                    }
                }
                stack.extend(children.iter().rev());
            }
        }

        for (id, node) in self.iter() {
            let Some(link) = node.parent() else {
                continue;
            };
            if !seen.contains(&link.owner) {
                continue;
            }
            let held = self
                .slot_children(link.owner, link.slot)
                .is_ok_and(|children| children.contains(&id));
            if !held {
                return Err(ValidationError::OrphanedChild {
                    owner: link.owner,
                    slot: link.slot,
                    child: id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use crate::node::{MethodDeclaration, NodeData, TypeDeclKind, TypeDeclaration, UnitNode};
    use crate::{Span, TypeIdentity};
    use pretty_assertions::assert_eq;

    fn class_with_method(arena: &mut NodeArena) -> (NodeId, NodeId) {
        let class = arena.alloc(
            TypeDeclaration::new(TypeDeclKind::Class, "A", TypeIdentity::new("p.A")),
            Span::DUMMY,
        );
        let method = arena.alloc(MethodDeclaration::new("run"), Span::DUMMY);
        arena.push_child(class, SlotName::Members, method).unwrap();
        (class, method)
    }

    #[test]
    fn test_consistent_subtree_is_valid() {
        let mut arena = NodeArena::new();
        let root = arena.alloc(NodeData::CompilationUnit(UnitNode::default()), Span::DUMMY);
        let (class, _) = class_with_method(&mut arena);
        arena.push_child(root, SlotName::Types, class).unwrap();
        assert_eq!(arena.validate_subtree(root), Ok(()));
        assert_eq!(arena.validate_subtree(class), Ok(()));
    }

    #[test]
    fn test_replaced_payload_keeps_children() {
        let mut arena = NodeArena::new();
        let (class, method) = class_with_method(&mut arena);
        arena
            .update_data(class, |data| {
                *data = NodeData::from(TypeDeclaration::new(
                    TypeDeclKind::Interface,
                    "A",
                    TypeIdentity::new("p.A"),
                ));
            })
            .unwrap();
        assert_eq!(arena.children(class), vec![method]);
        assert_eq!(arena.validate_subtree(class), Ok(()));
    }

    #[test]
    fn test_empty_identity_is_reported() {
        let mut arena = NodeArena::new();
        let class = arena.alloc(
            TypeDeclaration::new(TypeDeclKind::Class, "A", TypeIdentity::new("")),
            Span::DUMMY,
        );
        assert_eq!(
            arena.validate_subtree(class),
            Err(ValidationError::MissingField {
                node: class,
                kind: NodeKind::TypeDeclaration,
                field: "identity",
            })
        );
    }

    #[test]
    fn test_detached_nodes_are_ignored() {
        let mut arena = NodeArena::new();
        let (class, method) = class_with_method(&mut arena);
        arena.detach(method).unwrap();
        arena.alloc(MethodDeclaration::new(""), Span::DUMMY);
        assert_eq!(arena.validate_subtree(class), Ok(()));
    }
}
