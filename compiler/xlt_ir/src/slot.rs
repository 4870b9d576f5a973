//! Typed child slots.
//!
//! [`ChildLink`] holds zero or one child, [`ChildList`] an ordered sequence.
//! Both only store [`NodeId`]s; the parent backlink of every stored child is
//! kept in sync by [`NodeArena`](crate::NodeArena), which is the only place
//! allowed to mutate a slot. The type parameter restricts which node kinds a
//! slot admits.

use std::fmt;
use std::marker::PhantomData;

use crate::{NodeId, NodeKind};

/// Node kinds a slot accepts.
pub trait SlotType {
    /// Whether a node of `kind` may be stored in a slot of this type.
    fn admits(kind: NodeKind) -> bool;
}

/// Slot type for the members of a type declaration.
///
/// Admits methods, fields and nested types.
#[derive(Copy, Clone, Debug)]
pub enum BodyDeclaration {}

impl SlotType for BodyDeclaration {
    fn admits(kind: NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::MethodDeclaration | NodeKind::FieldDeclaration | NodeKind::TypeDeclaration
        )
    }
}

/// Type-erased read view of a slot.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SlotView<'a> {
    pub(crate) children: &'a [NodeId],
    pub(crate) admits: fn(NodeKind) -> bool,
    pub(crate) is_list: bool,
}

/// Type-erased mutable view of a slot.
pub(crate) enum SlotMut<'a> {
    Link(&'a mut Option<NodeId>),
    List(&'a mut Vec<NodeId>),
}

/// Zero-or-one owned child.
pub struct ChildLink<T> {
    child: Option<NodeId>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: SlotType> ChildLink<T> {
    pub fn new() -> Self {
        ChildLink {
            child: None,
            _marker: PhantomData,
        }
    }

    /// The current occupant, if any.
    #[inline]
    pub fn get(&self) -> Option<NodeId> {
        self.child
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.child.is_some()
    }

    pub(crate) fn view(&self) -> SlotView<'_> {
        SlotView {
            children: self.child.as_slice(),
            admits: T::admits,
            is_list: false,
        }
    }

    pub(crate) fn view_mut(&mut self) -> SlotMut<'_> {
        SlotMut::Link(&mut self.child)
    }

    pub(crate) fn try_map<E>(
        &self,
        f: &mut impl FnMut(NodeId) -> Result<NodeId, E>,
    ) -> Result<Self, E> {
        Ok(ChildLink {
            child: self.child.map(f).transpose()?,
            _marker: PhantomData,
        })
    }
}

impl<T: SlotType> Default for ChildLink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ChildLink<T> {
    fn clone(&self) -> Self {
        ChildLink {
            child: self.child,
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for ChildLink<T> {
    fn eq(&self, other: &Self) -> bool {
        self.child == other.child
    }
}

impl<T> Eq for ChildLink<T> {}

impl<T> fmt::Debug for ChildLink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildLink({:?})", self.child)
    }
}

/// Ordered sequence of owned children.
pub struct ChildList<T> {
    children: Vec<NodeId>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: SlotType> ChildList<T> {
    pub fn new() -> Self {
        ChildList {
            children: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.children
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    /// Position of `id` in the sequence.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.children.iter().position(|&child| child == id)
    }

    pub(crate) fn view(&self) -> SlotView<'_> {
        SlotView {
            children: &self.children,
            admits: T::admits,
            is_list: true,
        }
    }

    pub(crate) fn view_mut(&mut self) -> SlotMut<'_> {
        SlotMut::List(&mut self.children)
    }

    pub(crate) fn try_map<E>(
        &self,
        f: &mut impl FnMut(NodeId) -> Result<NodeId, E>,
    ) -> Result<Self, E> {
        let children = self
            .children
            .iter()
            .map(|&child| f(child))
            .collect::<Result<_, _>>()?;
        Ok(ChildList {
            children,
            _marker: PhantomData,
        })
    }
}

impl<T: SlotType> Default for ChildList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ChildList<T> {
    fn clone(&self) -> Self {
        ChildList {
            children: self.children.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for ChildList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl<T> Eq for ChildList<T> {}

impl<T> fmt::Debug for ChildList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.children).finish()
    }
}
