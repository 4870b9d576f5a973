//! Node arena and ownership discipline.
//!
//! Every node of a compilation unit lives in one [`NodeArena`]. A node is
//! owned by at most one slot at a time; its [`ParentLink`] names the owner
//! and the slot. All slot mutation goes through the arena so the link and
//! the slot contents never disagree:
//!
//! - attaching an already-attached node is rejected, callers detach first
//! - a slot only admits the node kinds its type allows
//! - a node can never become its own ancestor
//!
//! Detached nodes stay allocated. They can be re-attached, copied, or simply
//! dropped with the arena.

use rustc_hash::FxHashSet;

use crate::node::NodeData;
use crate::slot::SlotMut;
use crate::{NodeId, NodeKind, SlotName, Span};

/// Back-reference from a child to the slot holding it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParentLink {
    pub owner: NodeId,
    pub slot: SlotName,
}

/// A node record: payload, source span and parent link.
#[derive(Clone, Debug)]
pub struct Node {
    data: NodeData,
    span: Span,
    parent: Option<ParentLink>,
}

impl Node {
    #[inline]
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }
}

/// Ownership violation or bad slot addressing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("{kind} node {node:?} has no `{slot}` slot")]
    NoSuchSlot {
        node: NodeId,
        kind: NodeKind,
        slot: SlotName,
    },
    #[error("`{slot}` slot does not accept a {found} node")]
    KindMismatch { slot: SlotName, found: NodeKind },
    #[error("node {child:?} is already attached to `{slot}` of {owner:?}")]
    AlreadyAttached {
        child: NodeId,
        owner: NodeId,
        slot: SlotName,
    },
    #[error("attaching {child:?} under {owner:?} would make it its own ancestor")]
    Cycle { owner: NodeId, child: NodeId },
    #[error("index {index} out of range for `{slot}` slot of length {len}")]
    IndexOutOfRange {
        slot: SlotName,
        index: usize,
        len: usize,
    },
    #[error("`{slot}` slot holds a single child")]
    NotAList { slot: SlotName },
    #[error("`{slot}` slot cannot take {count} nodes")]
    TooManyForLink { slot: SlotName, count: usize },
    #[error("node {0:?} is not attached")]
    NotAttached(NodeId),
    #[error("payload edit would turn {node:?} from a {expected} into a {found}")]
    KindChanged {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },
    #[error("node arena is out of ids")]
    ArenaFull,
}

/// Flat storage for the nodes of one tree.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Allocate an unattached node.
    ///
    /// Child slots of `data` are emptied; children are attached through
    /// [`set_child`](Self::set_child), [`push_child`](Self::push_child) and
    /// friends so their parent links stay consistent.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX + 1` nodes. Use
    /// [`try_alloc`](Self::try_alloc) to get [`TreeError::ArenaFull`] instead.
    pub fn alloc(&mut self, data: impl Into<NodeData>, span: Span) -> NodeId {
        match self.try_alloc(data, span) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocate an unattached node, failing once node ids are exhausted.
    pub fn try_alloc(
        &mut self,
        data: impl Into<NodeData>,
        span: Span,
    ) -> Result<NodeId, TreeError> {
        self.push_node(data.into().without_children(), span)
    }

    fn push_node(&mut self, data: NodeData, span: Span) -> Result<NodeId, TreeError> {
        let id = NodeId::from_index(self.nodes.len()).ok_or(TreeError::ArenaFull)?;
        self.nodes.push(Node {
            data,
            span,
            parent: None,
        });
        Ok(id)
    }

    /// Number of allocated nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    #[inline]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(Node::data)
    }

    /// Edit the payload of `id` in place, returning what `f` returns.
    ///
    /// Only scalar fields change this way. The node's slot contents are put
    /// back after `f` runs, so a payload written wholesale (say, one cloned
    /// from another node) keeps this node's own children. Changing the
    /// node's kind is rejected and leaves the payload as it was.
    pub fn update_data<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut NodeData) -> R,
    ) -> Result<R, TreeError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))?;
        let original = node.data.clone();
        let result = f(&mut node.data);
        let (expected, found) = (original.kind(), node.data.kind());
        if expected != found {
            node.data = original;
            return Err(TreeError::KindChanged {
                node: id,
                expected,
                found,
            });
        }
        node.data.restore_slots(&original);
        Ok(result)
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.get(id).map(Node::span)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<ParentLink> {
        self.get(id).and_then(Node::parent)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.parent(id).is_some()
    }

    /// Iterator over the owners of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id).map(|link| link.owner), move |&owner| {
            self.parent(owner).map(|link| link.owner)
        })
    }

    /// Children of `id` across all of its slots, in traversal order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.data(id)
            .map(|data| data.slot_children().map(|(_, child)| child).collect())
            .unwrap_or_default()
    }

    /// Children held by one slot of `owner`.
    pub fn slot_children(&self, owner: NodeId, slot: SlotName) -> Result<&[NodeId], TreeError> {
        let node = self.node(owner)?;
        node.data
            .slot(slot)
            .map(|view| view.children)
            .ok_or(TreeError::NoSuchSlot {
                node: owner,
                kind: node.kind(),
                slot,
            })
    }

    /// Check that `child` may be placed into `slot` of `owner`.
    fn check_attachable(
        &self,
        owner: NodeId,
        slot: SlotName,
        child: NodeId,
    ) -> Result<(), TreeError> {
        let owner_node = self.node(owner)?;
        let child_node = self.node(child)?;
        if let Some(link) = child_node.parent {
            return Err(TreeError::AlreadyAttached {
                child,
                owner: link.owner,
                slot: link.slot,
            });
        }
        let view = owner_node.data.slot(slot).ok_or(TreeError::NoSuchSlot {
            node: owner,
            kind: owner_node.kind(),
            slot,
        })?;
        if !(view.admits)(child_node.kind()) {
            return Err(TreeError::KindMismatch {
                slot,
                found: child_node.kind(),
            });
        }
        if owner == child || self.ancestors(owner).any(|ancestor| ancestor == child) {
            return Err(TreeError::Cycle { owner, child });
        }
        Ok(())
    }

    fn slot_mut(&mut self, owner: NodeId, slot: SlotName) -> Result<SlotMut<'_>, TreeError> {
        let node = self
            .nodes
            .get_mut(owner.index())
            .ok_or(TreeError::UnknownNode(owner))?;
        let kind = node.data.kind();
        node.data.slot_mut(slot).ok_or(TreeError::NoSuchSlot {
            node: owner,
            kind,
            slot,
        })
    }

    fn link(&mut self, child: NodeId, parent: Option<ParentLink>) {
        if let Some(node) = self.nodes.get_mut(child.index()) {
            node.parent = parent;
        }
    }

    /// Put `child` into a single-child slot, returning the detached previous
    /// occupant.
    ///
    /// `None` clears the slot. Setting the current occupant again is a no-op.
    pub fn set_child(
        &mut self,
        owner: NodeId,
        slot: SlotName,
        child: Option<NodeId>,
    ) -> Result<Option<NodeId>, TreeError> {
        let current = match self.slot_mut(owner, slot)? {
            SlotMut::Link(current) => *current,
            SlotMut::List(_) => return Err(TreeError::NotAList { slot }),
        };
        if child.is_some() && child == current {
            return Ok(current);
        }
        if let Some(child) = child {
            self.check_attachable(owner, slot, child)?;
        }
        let previous = match self.slot_mut(owner, slot)? {
            SlotMut::Link(occupant) => std::mem::replace(occupant, child),
            SlotMut::List(_) => return Err(TreeError::NotAList { slot }),
        };
        if let Some(previous) = previous {
            self.link(previous, None);
        }
        if let Some(child) = child {
            self.link(child, Some(ParentLink { owner, slot }));
        }
        Ok(previous)
    }

    /// Append `child` to a sequence slot.
    pub fn push_child(
        &mut self,
        owner: NodeId,
        slot: SlotName,
        child: NodeId,
    ) -> Result<(), TreeError> {
        let len = self.list_len(owner, slot)?;
        self.insert_child(owner, slot, len, child)
    }

    /// Insert `child` at `index` of a sequence slot, shifting later children.
    pub fn insert_child(
        &mut self,
        owner: NodeId,
        slot: SlotName,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        let len = self.list_len(owner, slot)?;
        if index > len {
            return Err(TreeError::IndexOutOfRange { slot, index, len });
        }
        self.check_attachable(owner, slot, child)?;
        if let SlotMut::List(children) = self.slot_mut(owner, slot)? {
            children.insert(index, child);
        }
        self.link(child, Some(ParentLink { owner, slot }));
        Ok(())
    }

    /// Remove and detach the child at `index` of a sequence slot.
    pub fn remove_child(
        &mut self,
        owner: NodeId,
        slot: SlotName,
        index: usize,
    ) -> Result<NodeId, TreeError> {
        let removed = match self.slot_mut(owner, slot)? {
            SlotMut::List(children) => {
                if index >= children.len() {
                    return Err(TreeError::IndexOutOfRange {
                        slot,
                        index,
                        len: children.len(),
                    });
                }
                children.remove(index)
            }
            SlotMut::Link(_) => return Err(TreeError::NotAList { slot }),
        };
        self.link(removed, None);
        Ok(removed)
    }

    fn list_len(&mut self, owner: NodeId, slot: SlotName) -> Result<usize, TreeError> {
        match self.slot_mut(owner, slot)? {
            SlotMut::List(children) => Ok(children.len()),
            SlotMut::Link(_) => Err(TreeError::NotAList { slot }),
        }
    }

    /// Detach `id` from whichever slot holds it, returning the old link.
    ///
    /// Detaching an unattached node is a no-op.
    pub fn detach(&mut self, id: NodeId) -> Result<Option<ParentLink>, TreeError> {
        let Some(link) = self.node(id)?.parent else {
            return Ok(None);
        };
        match self.slot_mut(link.owner, link.slot)? {
            SlotMut::Link(occupant) => {
                debug_assert_eq!(*occupant, Some(id));
                *occupant = None;
            }
            SlotMut::List(children) => children.retain(|&child| child != id),
        }
        self.link(id, None);
        Ok(Some(link))
    }

    /// Put `new` in the position `old` occupies and detach `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        let link = self.node(old)?.parent.ok_or(TreeError::NotAttached(old))?;
        if old == new {
            return Ok(());
        }
        self.check_attachable(link.owner, link.slot, new)?;
        match self.slot_mut(link.owner, link.slot)? {
            SlotMut::Link(occupant) => *occupant = Some(new),
            SlotMut::List(children) => {
                for child in children.iter_mut().filter(|child| **child == old) {
                    *child = new;
                }
            }
        }
        self.link(old, None);
        self.link(new, Some(link));
        Ok(())
    }

    /// Deep-copy nodes of another arena into a slot of `owner`.
    ///
    /// Every node in `sources` is copied with its whole subtree and the
    /// copies are attached in order. A single-child slot takes at most one.
    pub fn copy_from(
        &mut self,
        owner: NodeId,
        slot: SlotName,
        src: &NodeArena,
        sources: &[NodeId],
    ) -> Result<(), TreeError> {
        for &source in sources {
            src.node(source)?;
        }
        if slot.is_list() {
            for &source in sources {
                let copy = self.import_subtree(src, source)?;
                self.push_child(owner, slot, copy)?;
            }
            return Ok(());
        }
        match sources {
            [] => self.set_child(owner, slot, None).map(|_| ()),
            [source] => {
                let copy = self.import_subtree(src, *source)?;
                self.set_child(owner, slot, Some(copy)).map(|_| ())
            }
            _ => Err(TreeError::TooManyForLink {
                slot,
                count: sources.len(),
            }),
        }
    }

    /// Deep-copy the subtree rooted at `id` within this arena.
    ///
    /// The copy is unattached; no node of the copy is shared with the
    /// original.
    pub fn copy_subtree(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let source = self.node(id)?;
        let span = source.span;
        let data = source.data.clone();
        let copied = data.try_map_children(|child| self.copy_subtree(child))?;
        self.adopt(copied, span)
    }

    /// Deep-copy the subtree rooted at `id` of `src` into this arena.
    pub fn import_subtree(&mut self, src: &NodeArena, id: NodeId) -> Result<NodeId, TreeError> {
        let source = src.node(id)?;
        let data = &source.data;
        let copied = data.try_map_children(|child| self.import_subtree(src, child))?;
        self.adopt(copied, source.span)
    }

    /// Push a payload whose children are freshly copied and link them to it.
    fn adopt(&mut self, data: NodeData, span: Span) -> Result<NodeId, TreeError> {
        let links: Vec<(SlotName, NodeId)> = data.slot_children().collect();
        let id = self.push_node(data, span)?;
        for (slot, child) in links {
            self.link(child, Some(ParentLink { owner: id, slot }));
        }
        Ok(id)
    }

    /// Whether two subtrees have the same shape, payloads and spans.
    ///
    /// Node ids are ignored, so a subtree and its copy compare equal.
    pub fn structurally_equal(a: &NodeArena, a_id: NodeId, b: &NodeArena, b_id: NodeId) -> bool {
        let (Some(a_node), Some(b_node)) = (a.get(a_id), b.get(b_id)) else {
            return false;
        };
        if a_node.span != b_node.span || !a_node.data.same_payload(&b_node.data) {
            return false;
        }
        a_node.data.slot_names().iter().all(|&slot| {
            match (a_node.data.slot(slot), b_node.data.slot(slot)) {
                (Some(a_view), Some(b_view)) => {
                    a_view.children.len() == b_view.children.len()
                        && a_view
                            .children
                            .iter()
                            .zip(b_view.children)
                            .all(|(&a_child, &b_child)| {
                                Self::structurally_equal(a, a_child, b, b_child)
                            })
                }
                _ => false,
            }
        })
    }

    /// Ids of every node reachable from `root`, root included, in pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        let mut seen = FxHashSet::default();
        while let Some(id) = stack.pop() {
            if self.get(id).is_none() || !seen.insert(id) {
                continue;
            }
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Iterator over all nodes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        // push_node never stores a node whose index has no id.
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| Some((NodeId::from_index(index)?, node)))
    }

    pub(crate) fn slot_admits(&self, owner: NodeId, slot: SlotName, kind: NodeKind) -> bool {
        self.data(owner)
            .and_then(|data| data.slot(slot))
            .is_some_and(|view| (view.admits)(kind) && (view.is_list || view.children.len() <= 1))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
