use super::*;
use crate::node::{
    Comment, CommentKind, FieldDeclaration, MethodDeclaration, PackageDeclaration, TypeDeclKind,
    TypeDeclaration, UnitNode,
};
use crate::TypeIdentity;
use pretty_assertions::assert_eq;

fn unit_root(arena: &mut NodeArena) -> NodeId {
    arena.alloc(NodeData::CompilationUnit(UnitNode::default()), Span::DUMMY)
}

fn class(arena: &mut NodeArena, name: &str) -> NodeId {
    arena.alloc(
        TypeDeclaration::new(TypeDeclKind::Class, name, TypeIdentity::new(format!("p.{name}"))),
        Span::DUMMY,
    )
}

#[test]
fn test_set_child_updates_parent_link() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let package = arena.alloc(PackageDeclaration::new("p"), Span::DUMMY);

    assert_eq!(arena.set_child(root, SlotName::Package, Some(package)), Ok(None));
    assert_eq!(
        arena.parent(package),
        Some(ParentLink {
            owner: root,
            slot: SlotName::Package
        })
    );
    assert_eq!(arena.slot_children(root, SlotName::Package).unwrap(), &[package]);
}

#[test]
fn test_set_child_detaches_previous_occupant() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let first = arena.alloc(PackageDeclaration::new("a"), Span::DUMMY);
    let second = arena.alloc(PackageDeclaration::new("b"), Span::DUMMY);

    arena.set_child(root, SlotName::Package, Some(first)).unwrap();
    let previous = arena.set_child(root, SlotName::Package, Some(second)).unwrap();

    assert_eq!(previous, Some(first));
    assert!(!arena.is_attached(first));
    assert!(arena.is_attached(second));

    assert_eq!(arena.set_child(root, SlotName::Package, None), Ok(Some(second)));
    assert!(!arena.is_attached(second));
}

#[test]
fn test_setting_same_occupant_is_noop() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let package = arena.alloc(PackageDeclaration::new("a"), Span::DUMMY);
    arena.set_child(root, SlotName::Package, Some(package)).unwrap();
    assert_eq!(
        arena.set_child(root, SlotName::Package, Some(package)),
        Ok(Some(package))
    );
    assert!(arena.is_attached(package));
}

#[test]
fn test_attaching_owned_node_is_rejected() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let outer = class(&mut arena, "Outer");
    let inner = class(&mut arena, "Inner");

    arena.push_child(root, SlotName::Types, outer).unwrap();
    arena.push_child(outer, SlotName::Members, inner).unwrap();

    let err = arena.push_child(root, SlotName::Types, inner).unwrap_err();
    assert_eq!(
        err,
        TreeError::AlreadyAttached {
            child: inner,
            owner: outer,
            slot: SlotName::Members
        }
    );

    // Moving is detach-then-attach.
    arena.detach(inner).unwrap();
    arena.push_child(root, SlotName::Types, inner).unwrap();
    assert_eq!(arena.slot_children(root, SlotName::Types).unwrap(), &[outer, inner]);
    assert!(arena.slot_children(outer, SlotName::Members).unwrap().is_empty());
}

#[test]
fn test_slot_rejects_wrong_kind() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let method = arena.alloc(MethodDeclaration::new("run"), Span::DUMMY);

    assert_eq!(
        arena.push_child(root, SlotName::Types, method),
        Err(TreeError::KindMismatch {
            slot: SlotName::Types,
            found: NodeKind::MethodDeclaration
        })
    );
    assert!(!arena.is_attached(method));
}

#[test]
fn test_missing_slot_and_shape_errors() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let method = arena.alloc(MethodDeclaration::new("run"), Span::DUMMY);
    let field = arena.alloc(FieldDeclaration::new("x", "int"), Span::DUMMY);
    let package = arena.alloc(PackageDeclaration::new("p"), Span::DUMMY);

    assert!(matches!(
        arena.push_child(method, SlotName::Members, field),
        Err(TreeError::NoSuchSlot { .. })
    ));
    assert_eq!(
        arena.push_child(root, SlotName::Package, package),
        Err(TreeError::NotAList {
            slot: SlotName::Package
        })
    );
    assert!(matches!(
        arena.set_child(root, SlotName::Types, Some(package)),
        Err(TreeError::NotAList { .. })
    ));
    assert_eq!(
        arena.push_child(root, SlotName::Types, NodeId::new(99)),
        Err(TreeError::UnknownNode(NodeId::new(99)))
    );
}

#[test]
fn test_cycle_is_rejected() {
    let mut arena = NodeArena::new();
    let outer = class(&mut arena, "Outer");
    let inner = class(&mut arena, "Inner");
    arena.push_child(outer, SlotName::Members, inner).unwrap();

    assert_eq!(
        arena.push_child(outer, SlotName::Members, outer),
        Err(TreeError::Cycle {
            owner: outer,
            child: outer
        })
    );
    assert_eq!(
        arena.push_child(inner, SlotName::Members, outer),
        Err(TreeError::Cycle {
            owner: inner,
            child: outer
        })
    );
}

#[test]
fn test_insert_and_remove_keep_order() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let a = class(&mut arena, "A");
    let b = class(&mut arena, "B");
    let c = class(&mut arena, "C");

    arena.push_child(root, SlotName::Types, a).unwrap();
    arena.push_child(root, SlotName::Types, c).unwrap();
    arena.insert_child(root, SlotName::Types, 1, b).unwrap();
    assert_eq!(arena.slot_children(root, SlotName::Types).unwrap(), &[a, b, c]);

    let d = class(&mut arena, "D");
    assert_eq!(
        arena.insert_child(root, SlotName::Types, 5, d),
        Err(TreeError::IndexOutOfRange {
            slot: SlotName::Types,
            index: 5,
            len: 3
        })
    );

    assert_eq!(arena.remove_child(root, SlotName::Types, 0), Ok(a));
    assert!(!arena.is_attached(a));
    assert_eq!(arena.slot_children(root, SlotName::Types).unwrap(), &[b, c]);
}

#[test]
fn test_replace_takes_position() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let a = class(&mut arena, "A");
    let b = class(&mut arena, "B");
    let c = class(&mut arena, "C");
    arena.push_child(root, SlotName::Types, a).unwrap();
    arena.push_child(root, SlotName::Types, b).unwrap();

    arena.replace(a, c).unwrap();

    assert_eq!(arena.slot_children(root, SlotName::Types).unwrap(), &[c, b]);
    assert!(!arena.is_attached(a));
    assert_eq!(arena.parent(c).map(|link| link.owner), Some(root));
    assert_eq!(arena.replace(a, c), Err(TreeError::NotAttached(a)));
}

#[test]
fn test_children_follow_slot_order() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let ty = class(&mut arena, "A");
    let comment = arena.alloc(Comment::new(CommentKind::Line), Span::new(0, 4));
    let package = arena.alloc(PackageDeclaration::new("p"), Span::DUMMY);

    arena.push_child(root, SlotName::Types, ty).unwrap();
    arena.push_child(root, SlotName::Comments, comment).unwrap();
    arena.set_child(root, SlotName::Package, Some(package)).unwrap();

    assert_eq!(arena.children(root), vec![package, comment, ty]);
    assert_eq!(arena.descendants(root), vec![root, package, comment, ty]);
}

#[test]
fn test_copy_subtree_is_disjoint() {
    let mut arena = NodeArena::new();
    let outer = class(&mut arena, "Outer");
    let inner = class(&mut arena, "Inner");
    let method = arena.alloc(MethodDeclaration::new("testRun"), Span::new(3, 9));
    arena.push_child(outer, SlotName::Members, inner).unwrap();
    arena.push_child(inner, SlotName::Members, method).unwrap();

    let copy = arena.copy_subtree(outer).unwrap();

    assert!(!arena.is_attached(copy));
    assert!(NodeArena::structurally_equal(&arena, outer, &arena, copy));
    let original_nodes = arena.descendants(outer);
    for node in arena.descendants(copy) {
        assert!(!original_nodes.contains(&node));
        for ancestor in arena.ancestors(node) {
            assert!(!original_nodes.contains(&ancestor));
        }
    }

    // Mutating the copy leaves the original alone.
    let copied_inner = arena.slot_children(copy, SlotName::Members).unwrap()[0];
    let copied_method = arena.slot_children(copied_inner, SlotName::Members).unwrap()[0];
    arena.remove_child(copied_inner, SlotName::Members, 0).unwrap();
    arena
        .update_data(copied_method, |data| {
            if let NodeData::MethodDeclaration(m) = data {
                m.name = "renamed".to_owned();
            }
        })
        .unwrap();
    assert_eq!(arena.slot_children(inner, SlotName::Members).unwrap(), &[method]);
    assert_eq!(
        arena.data(method).and_then(NodeData::as_method_declaration).map(|m| m.name.as_str()),
        Some("testRun")
    );
    assert!(!NodeArena::structurally_equal(&arena, outer, &arena, copy));
}

#[test]
fn test_copy_from_other_arena() {
    let mut src = NodeArena::new();
    let a = class(&mut src, "A");
    let b = class(&mut src, "B");
    let field = src.alloc(FieldDeclaration::new("x", "int"), Span::DUMMY);
    src.push_child(a, SlotName::Members, field).unwrap();

    let mut dst = NodeArena::new();
    let root = unit_root(&mut dst);
    dst.copy_from(root, SlotName::Types, &src, &[a, b]).unwrap();

    let types = dst.slot_children(root, SlotName::Types).unwrap().to_vec();
    assert_eq!(types.len(), 2);
    assert!(NodeArena::structurally_equal(&src, a, &dst, types[0]));
    assert!(NodeArena::structurally_equal(&src, b, &dst, types[1]));
    // Source arena untouched.
    assert!(!src.is_attached(a));
    assert_eq!(src.len(), 3);
}

#[test]
fn test_copy_from_into_link() {
    let mut src = NodeArena::new();
    let p = src.alloc(PackageDeclaration::new("p"), Span::DUMMY);
    let q = src.alloc(PackageDeclaration::new("q"), Span::DUMMY);

    let mut dst = NodeArena::new();
    let root = unit_root(&mut dst);
    dst.copy_from(root, SlotName::Package, &src, &[p]).unwrap();
    assert_eq!(dst.slot_children(root, SlotName::Package).unwrap().len(), 1);
    assert_eq!(
        dst.copy_from(root, SlotName::Package, &src, &[p, q]),
        Err(TreeError::TooManyForLink {
            slot: SlotName::Package,
            count: 2
        })
    );
}

#[test]
fn test_alloc_empties_slots() {
    let mut arena = NodeArena::new();
    let outer = class(&mut arena, "Outer");
    let inner = class(&mut arena, "Inner");
    arena.push_child(outer, SlotName::Members, inner).unwrap();

    let cloned = arena.data(outer).cloned().unwrap();
    let fresh = arena.alloc(cloned, Span::DUMMY);
    assert!(arena.children(fresh).is_empty());
    assert_eq!(arena.parent(inner).map(|link| link.owner), Some(outer));
}

#[test]
fn test_update_data_edits_scalars() {
    let mut arena = NodeArena::new();
    let outer = class(&mut arena, "Outer");
    let method = arena.alloc(MethodDeclaration::new("run"), Span::DUMMY);
    arena.push_child(outer, SlotName::Members, method).unwrap();

    let old = arena
        .update_data(outer, |data| match data {
            NodeData::TypeDeclaration(decl) => std::mem::replace(&mut decl.name, "Renamed".into()),
            _ => String::new(),
        })
        .unwrap();

    assert_eq!(old, "Outer");
    let decl = arena.data(outer).and_then(NodeData::as_type_declaration).unwrap();
    assert_eq!(decl.name, "Renamed");
    assert_eq!(decl.members().as_slice(), &[method]);
    assert_eq!(
        arena.update_data(NodeId::new(99), |_| ()),
        Err(TreeError::UnknownNode(NodeId::new(99)))
    );
}

#[test]
fn test_update_data_keeps_own_children() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let outer = class(&mut arena, "Outer");
    let inner = class(&mut arena, "Inner");
    let other = class(&mut arena, "Other");
    arena.push_child(outer, SlotName::Members, inner).unwrap();
    arena.push_child(root, SlotName::Types, outer).unwrap();
    arena.push_child(root, SlotName::Types, other).unwrap();

    // Writing another class's payload wholesale must not share its members,
    // nor may a node be made its own ancestor.
    let cloned = arena.data(outer).cloned().unwrap();
    arena.update_data(other, |data| *data = cloned).unwrap();
    let cloned_root = arena.data(root).cloned().unwrap();
    arena.update_data(inner, |data| *data = cloned_root).unwrap_err();
    let cloned_outer = arena.data(outer).cloned().unwrap();
    arena.update_data(inner, |data| *data = cloned_outer).unwrap();

    assert_eq!(arena.slot_children(outer, SlotName::Members).unwrap(), &[inner]);
    assert!(arena.slot_children(other, SlotName::Members).unwrap().is_empty());
    assert!(arena.slot_children(inner, SlotName::Members).unwrap().is_empty());
    assert_eq!(
        arena.data(other).and_then(NodeData::as_type_declaration).map(|d| d.name.as_str()),
        Some("Outer")
    );
    assert_eq!(arena.validate_subtree(root), Ok(()));

    let copy = arena.copy_subtree(root).unwrap();
    assert!(NodeArena::structurally_equal(&arena, root, &arena, copy));
}

#[test]
fn test_update_data_ignores_foreign_children() {
    let mut foreign = NodeArena::new();
    let big = class(&mut foreign, "Big");
    for i in 0..10 {
        let field = foreign.alloc(FieldDeclaration::new(format!("f{i}"), "int"), Span::DUMMY);
        foreign.push_child(big, SlotName::Members, field).unwrap();
    }

    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let outer = class(&mut arena, "Outer");
    arena.push_child(root, SlotName::Types, outer).unwrap();
    let payload = foreign.data(big).cloned().unwrap();
    arena.update_data(outer, |data| *data = payload).unwrap();

    assert!(arena.children(outer).is_empty());
    let copy = arena.copy_subtree(root).unwrap();
    assert_eq!(arena.descendants(copy).len(), 2);
}

#[test]
fn test_update_data_rejects_kind_change() {
    let mut arena = NodeArena::new();
    let method = arena.alloc(MethodDeclaration::new("run"), Span::DUMMY);

    assert_eq!(
        arena.update_data(method, |data| *data = FieldDeclaration::new("x", "int").into()),
        Err(TreeError::KindChanged {
            node: method,
            expected: NodeKind::MethodDeclaration,
            found: NodeKind::FieldDeclaration,
        })
    );
    assert_eq!(arena.kind(method), Some(NodeKind::MethodDeclaration));
    assert_eq!(
        arena.data(method).and_then(NodeData::as_method_declaration).map(|m| m.name.as_str()),
        Some("run")
    );
}

#[test]
fn test_try_alloc_issues_dense_ids() {
    let mut arena = NodeArena::new();
    let root = unit_root(&mut arena);
    let package = arena.try_alloc(PackageDeclaration::new("p"), Span::DUMMY).unwrap();
    assert_eq!((root, package), (NodeId::new(0), NodeId::new(1)));
    assert_eq!(arena.iter().map(|(id, _)| id).collect::<Vec<_>>(), [root, package]);
    assert_eq!(TreeError::ArenaFull.to_string(), "node arena is out of ids");
}
