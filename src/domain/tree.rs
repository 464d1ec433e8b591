//! Arena-backed N-ary tree with a fixed branching factor.
//!
//! The [`Tree`] is the root: it owns the node arena, the layer-width tracker
//! and its own child slots. Nodes are created through the root, linked with
//! [`Tree::insert_child`] and released together by [`Tree::free_tree`].

use std::collections::VecDeque;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{ArenaConfig, ArenaStats, NodeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::layers::LayerWidths;
use crate::domain::node::{ChildSlots, ChildrenBearing, NodeId, Parent, TreeNode};

/// Root of an arena-backed tree.
#[derive(Debug)]
pub struct Tree {
    /// Child slots; always the first field, shared layout with [`TreeNode`].
    slots: ChildSlots,
    branching_factor: usize,
    layers: LayerWidths,
    arena: NodeArena,
}

impl ChildrenBearing for Tree {
    fn child_slots(&self) -> &ChildSlots {
        &self.slots
    }
}

impl Tree {
    /// Creates an empty tree with the default arena config.
    pub fn new(branching_factor: usize) -> DomainResult<Self> {
        Self::with_arena(branching_factor, ArenaConfig::default())
    }

    /// Creates an empty tree whose nodes come from an arena built from `config`.
    ///
    /// Fails with [`DomainError::InvalidBranchingFactor`] for zero or for a
    /// factor whose slot array cannot be addressed, and with
    /// [`DomainError::OutOfMemory`] when the root's slots cannot be allocated.
    #[instrument(level = "debug")]
    pub fn with_arena(branching_factor: usize, config: ArenaConfig) -> DomainResult<Self> {
        if branching_factor == 0 {
            return Err(DomainError::InvalidBranchingFactor(branching_factor));
        }
        let slots = ChildSlots::new(branching_factor)?;
        let arena = NodeArena::new(config)?;
        Ok(Self {
            slots,
            branching_factor,
            layers: LayerWidths::new(),
            arena,
        })
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn layers(&self) -> &LayerWidths {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerWidths {
        &mut self.layers
    }

    pub fn is_released(&self) -> bool {
        self.arena.is_released()
    }

    fn ensure_live(&self) -> DomainResult<()> {
        if self.arena.is_released() {
            return Err(DomainError::ArenaReleased);
        }
        Ok(())
    }

    /// Appends the width of the next layer to the tracker; returns its depth.
    pub fn record_layer_width(&mut self, count: usize) -> DomainResult<usize> {
        self.ensure_live()?;
        Ok(self.layers.record_layer_width(count))
    }

    /// Dequeues the oldest recorded layer width.
    pub fn next_layer_width(&mut self) -> DomainResult<usize> {
        self.ensure_live()?;
        self.layers.next_layer_width()
    }

    /// Allocates a detached node with `branching_factor` empty slots.
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(&mut self) -> DomainResult<NodeId> {
        self.ensure_live()?;
        self.arena.allocate(TreeNode::new(self.branching_factor)?)
    }

    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.arena.get(id)
    }

    /// Children view of either the root or a node.
    pub fn view(&self, parent: Parent) -> DomainResult<&dyn ChildrenBearing> {
        match parent {
            Parent::Root => {
                self.ensure_live()?;
                Ok(self as &dyn ChildrenBearing)
            }
            Parent::Node(id) => Ok(self.arena.get(id)? as &dyn ChildrenBearing),
        }
    }

    /// Appends `child` to the next free slot of `parent`; returns the slot index.
    ///
    /// The child must be detached. Inserting a node below one of its own
    /// descendants is rejected. On error neither node is modified.
    pub fn insert_child<P: Into<Parent>>(&mut self, parent: P, child: NodeId) -> DomainResult<usize> {
        self.attach(parent.into(), child)
    }

    #[instrument(level = "trace", skip(self))]
    fn attach(&mut self, parent: Parent, child: NodeId) -> DomainResult<usize> {
        if self.arena.get(child)?.parent.is_some() {
            return Err(DomainError::AlreadyAttached(child));
        }

        match parent {
            Parent::Root => {
                if self.slots.is_full() {
                    return Err(DomainError::CapacityExceeded {
                        branching_factor: self.branching_factor,
                    });
                }
            }
            Parent::Node(parent_id) => {
                if parent_id == child {
                    return Err(DomainError::CycleDetected(child));
                }
                let parent_node = self.arena.get(parent_id)?;
                if parent_node.slots.is_full() {
                    return Err(DomainError::CapacityExceeded {
                        branching_factor: self.branching_factor,
                    });
                }
                let mut cursor = parent_node.parent;
                while let Some(Parent::Node(ancestor)) = cursor {
                    if ancestor == child {
                        return Err(DomainError::CycleDetected(child));
                    }
                    cursor = self.arena.get(ancestor)?.parent;
                }
            }
        }

        let slot = match parent {
            Parent::Root => self.slots.push(child)?,
            Parent::Node(parent_id) => self.arena.get_mut(parent_id)?.slots.push(child)?,
        };
        self.arena.get_mut(child)?.parent = Some(parent);
        trace!("attached {child} to {parent} at slot {slot}");
        Ok(slot)
    }

    /// Walks every arena node below `from` (and `from` itself when it is a
    /// node) in post-order, children before parents. Returns the number of
    /// nodes visited.
    ///
    /// Nodes hold nothing outside the arena, so the walk has nothing to
    /// release; memory goes back in bulk with [`free_tree`](Self::free_tree).
    #[instrument(level = "debug", skip(self))]
    pub fn free_subtree(&self, from: Parent) -> DomainResult<usize> {
        let mut stack: Vec<(NodeId, bool)> = match from {
            Parent::Root => {
                self.ensure_live()?;
                self.slots.iter().rev().map(|id| (id, false)).collect()
            }
            Parent::Node(id) => {
                self.arena.get(id)?;
                vec![(id, false)]
            }
        };

        let mut visited = 0;
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                trace!("free {id}");
                visited += 1;
                continue;
            }
            let node = self.arena.get(id)?;
            stack.push((id, true));
            stack.extend(node.children().rev().map(|child| (child, false)));
        }
        Ok(visited)
    }

    /// Tears the tree down: walks it, clears the tracker and releases the
    /// arena. Returns the arena accounting that was released.
    ///
    /// Every later operation, including a second `free_tree`, fails with
    /// [`DomainError::ArenaReleased`].
    #[instrument(level = "debug", skip(self))]
    pub fn free_tree(&mut self) -> DomainResult<ArenaStats> {
        let visited = self.free_subtree(Parent::Root)?;
        self.layers.clear();
        self.slots.clear();
        let stats = self.arena.release_all()?;
        debug!(
            "released tree: {visited} attached nodes, {} allocated, {} bytes",
            stats.allocated_nodes, stats.bytes_outstanding
        );
        Ok(stats)
    }

    /// Pre-order iterator over attached nodes.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// Post-order iterator over attached nodes.
    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Breadth-first iterator yielding `(node, depth)`; root children are depth 1.
    pub fn iter_breadth_first(&self) -> BreadthFirstIter<'_> {
        BreadthFirstIter::new(self)
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Depth of the deepest attached node; a tree with only the root has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter_breadth_first()
            .map(|(_, depth)| depth)
            .max()
            .unwrap_or(0)
    }

    /// Counts nodes per depth, breadth-first, starting with the root layer (1).
    #[instrument(level = "debug", skip(self))]
    pub fn measure_layers(&self) -> DomainResult<Vec<usize>> {
        self.ensure_live()?;
        let mut widths = vec![1];
        let mut frontier: Vec<NodeId> = self.slots.iter().collect();
        while !frontier.is_empty() {
            widths.push(frontier.len());
            let mut next = Vec::with_capacity(frontier.len() * self.branching_factor);
            for id in frontier {
                next.extend(self.arena.get(id)?.children());
            }
            frontier = next;
        }
        Ok(widths)
    }

    /// Replaces the tracker contents with the measured layer widths.
    pub fn track_layers(&mut self) -> DomainResult<usize> {
        let widths = self.measure_layers()?;
        let layers = widths.len();
        self.layers.clear();
        self.layers.extend(widths);
        Ok(layers)
    }
}

pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: tree.slots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.tree.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: tree.slots.iter().rev().map(|id| (id, false)).collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Ok(node) = self.tree.arena.get(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                self.stack
                    .extend(node.children().rev().map(|child| (child, false)));
            }
        }
        None
    }
}

pub struct BreadthFirstIter<'a> {
    tree: &'a Tree,
    queue: VecDeque<(NodeId, usize)>,
}

impl<'a> BreadthFirstIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            queue: tree.slots.iter().map(|id| (id, 1)).collect(),
        }
    }
}

impl Iterator for BreadthFirstIter<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, depth)) = self.queue.pop_front() {
            if let Ok(node) = self.tree.arena.get(current) {
                self.queue
                    .extend(node.children().map(|child| (child, depth + 1)));
                return Some((current, depth));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_zero_branching_factor_when_creating_then_invalid() {
        assert_eq!(
            Tree::new(0).unwrap_err(),
            DomainError::InvalidBranchingFactor(0)
        );
    }

    #[test]
    fn given_new_tree_when_created_then_empty_root() {
        let tree = Tree::new(3).unwrap();
        assert_eq!(tree.branching_factor(), 3);
        assert_eq!(tree.child_count(), 0);
        assert_eq!(tree.child_slots().capacity(), 3);
        assert!(tree.layers().is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.measure_layers().unwrap(), vec![1]);
    }

    #[test]
    fn given_node_when_inserted_under_itself_then_cycle() {
        let mut tree = Tree::new(2).unwrap();
        let a = tree.create_node().unwrap();
        assert_eq!(
            tree.insert_child(a, a).unwrap_err(),
            DomainError::CycleDetected(a)
        );
    }

    #[test]
    fn given_failed_insert_when_inspecting_then_nodes_unchanged() {
        let mut tree = Tree::new(1).unwrap();
        let a = tree.create_node().unwrap();
        let b = tree.create_node().unwrap();
        let c = tree.create_node().unwrap();
        tree.insert_child(a, b).unwrap();

        assert!(tree.insert_child(a, c).is_err());

        assert_eq!(tree.node(a).unwrap().child_count(), 1);
        assert!(tree.node(c).unwrap().parent().is_none());
    }

    #[test]
    fn given_detached_chain_when_walking_from_node_then_counts_node_and_descendants() {
        let mut tree = Tree::new(2).unwrap();
        let a = tree.create_node().unwrap();
        let b = tree.create_node().unwrap();
        let c = tree.create_node().unwrap();
        tree.insert_child(a, b).unwrap();
        tree.insert_child(b, c).unwrap();

        assert_eq!(tree.free_subtree(Parent::Node(a)).unwrap(), 3);
        assert_eq!(tree.free_subtree(Parent::Node(c)).unwrap(), 1);
        // Not attached to the root, so the root walk sees nothing.
        assert_eq!(tree.free_subtree(Parent::Root).unwrap(), 0);
    }
}
