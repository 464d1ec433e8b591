//! Tree nodes, node handles and the shared children view.
//!
//! The root and every interior node embed a [`ChildSlots`] as their first
//! field. Code that only needs to walk children goes through the
//! [`ChildrenBearing`] trait and never has to know which of the two it holds.

use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use generational_arena::Index;

use crate::domain::arena::ArenaId;
use crate::domain::error::{DomainError, DomainResult};

/// Opaque handle to a node allocated in a [`NodeArena`](crate::domain::arena::NodeArena).
///
/// Handles are validated against the arena that issued them: a handle from
/// another tree, or from a slot that no longer exists, is rejected instead of
/// resolving to unrelated memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) arena: ArenaId,
    pub(crate) index: Index,
}

impl NodeId {
    pub(crate) fn new(arena: ArenaId, index: Index) -> Self {
        Self { arena, index }
    }

    /// Slot number inside the owning arena.
    pub fn slot(&self) -> usize {
        self.index.into_raw_parts().0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "node {slot} (gen {generation}, {})", self.arena)
    }
}

/// Anything that can own children: the tree root or a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parent {
    Root,
    Node(NodeId),
}

impl From<NodeId> for Parent {
    fn from(id: NodeId) -> Self {
        Parent::Node(id)
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Root => write!(f, "root"),
            Parent::Node(id) => write!(f, "{id}"),
        }
    }
}

/// Fixed-capacity, insertion-ordered child slot array.
///
/// Slots `[0, len)` are occupied, slots `[len, capacity)` hold `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSlots {
    slots: Box<[Option<NodeId>]>,
    count: usize,
}

impl ChildSlots {
    /// Bytes needed for `capacity` slots, `None` if that exceeds `isize::MAX`.
    pub fn bytes_for(capacity: usize) -> Option<usize> {
        capacity
            .checked_mul(mem::size_of::<Option<NodeId>>())
            .filter(|&bytes| bytes <= isize::MAX as usize)
    }

    /// Allocates `capacity` empty slots.
    ///
    /// A capacity whose slot array cannot be addressed fails with
    /// [`DomainError::InvalidBranchingFactor`]; a failed heap allocation with
    /// [`DomainError::OutOfMemory`].
    pub fn new(capacity: usize) -> DomainResult<Self> {
        let bytes =
            Self::bytes_for(capacity).ok_or(DomainError::InvalidBranchingFactor(capacity))?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| DomainError::OutOfMemory {
                requested: bytes,
                capacity: 0,
            })?;
        slots.resize(capacity, None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    pub fn get(&self, i: usize) -> Option<NodeId> {
        if i < self.count {
            self.slots[i]
        } else {
            None
        }
    }

    /// Appends `child` into the next free slot and returns the slot index.
    pub fn push(&mut self, child: NodeId) -> DomainResult<usize> {
        if self.is_full() {
            return Err(DomainError::CapacityExceeded {
                branching_factor: self.capacity(),
            });
        }
        let slot = self.count;
        self.slots[slot] = Some(child);
        self.count += 1;
        Ok(slot)
    }

    /// Empties every slot, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.count = 0;
    }

    /// Raw slot view, including the trailing empty slots.
    pub fn as_slice(&self) -> &[Option<NodeId>] {
        &self.slots
    }

    pub fn iter(&self) -> Children<'_> {
        Children {
            inner: self.slots[..self.count].iter(),
        }
    }
}

/// Iterator over the occupied child slots, in insertion order.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: std::slice::Iter<'a, Option<NodeId>>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|slot| *slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.inner.next_back() {
            if slot.is_some() {
                return *slot;
            }
        }
        None
    }
}

impl FusedIterator for Children<'_> {}

/// Uniform read access to the children of either the root or a node.
pub trait ChildrenBearing {
    fn child_slots(&self) -> &ChildSlots;

    fn child_count(&self) -> usize {
        self.child_slots().len()
    }

    fn child_at(&self, i: usize) -> Option<NodeId> {
        self.child_slots().get(i)
    }

    fn children(&self) -> Children<'_> {
        self.child_slots().iter()
    }

    fn is_full(&self) -> bool {
        self.child_slots().is_full()
    }
}

/// Interior node of the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Child slots; always the first field, shared layout with the root.
    pub(crate) slots: ChildSlots,
    /// Owner of this node, `None` until the node is inserted somewhere.
    pub(crate) parent: Option<Parent>,
}

impl TreeNode {
    /// Creates a node with `branching_factor` empty slots and no parent.
    pub fn new(branching_factor: usize) -> DomainResult<Self> {
        Ok(Self {
            slots: ChildSlots::new(branching_factor)?,
            parent: None,
        })
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bytes charged to the arena for this node: header plus slot array.
    pub fn footprint(&self) -> usize {
        let slots = ChildSlots::bytes_for(self.slots.capacity()).unwrap_or(usize::MAX);
        mem::size_of::<Self>().saturating_add(slots)
    }
}

impl ChildrenBearing for TreeNode {
    fn child_slots(&self) -> &ChildSlots {
        &self.slots
    }
}
