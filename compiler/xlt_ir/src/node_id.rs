//! Node handles.
//!
//! Nodes never hold each other by pointer: parents and children refer to
//! each other through `NodeId`s issued by the owning
//! [`NodeArena`](crate::NodeArena).

use std::fmt;

/// Handle of one node in a [`NodeArena`](crate::NodeArena).
///
/// Ids are dense and handed out in allocation order, so the root of a
/// compilation unit is always `NodeId(0)`. An id means nothing to any arena
/// but the one that issued it; copying a subtree into another arena issues
/// fresh ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Id of arena slot `index`, `None` once ids no longer fit in 32 bits.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(NodeId)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}
