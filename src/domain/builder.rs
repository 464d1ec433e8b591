//! Breadth-first, layer-by-layer tree construction.

use tracing::{debug, instrument};

use crate::domain::arena::ArenaConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::Parent;
use crate::domain::tree::Tree;

/// Builds trees one layer at a time, recording each layer's width in the
/// tree's tracker as soon as the layer is complete.
///
/// The root is layer 0, so every build starts the tracker with `1`.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    branching_factor: usize,
    arena: ArenaConfig,
}

impl TreeBuilder {
    pub fn new(branching_factor: usize) -> Self {
        Self {
            branching_factor,
            arena: ArenaConfig::default(),
        }
    }

    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    /// Complete tree of the given depth: every node gets all
    /// `branching_factor` children before the next layer starts.
    pub fn build_complete(&self, depth: usize) -> DomainResult<Tree> {
        self.build_layers(&vec![self.branching_factor; depth])
    }

    /// Every node of layer `d` receives `fanouts[d]` children.
    ///
    /// A fanout above the branching factor fails with
    /// [`DomainError::CapacityExceeded`] before any node is allocated. A fanout
    /// of zero ends the build; no empty layer is recorded.
    #[instrument(level = "debug", skip(self), fields(b = self.branching_factor))]
    pub fn build_layers(&self, fanouts: &[usize]) -> DomainResult<Tree> {
        if fanouts.iter().any(|&fanout| fanout > self.branching_factor) {
            return Err(DomainError::CapacityExceeded {
                branching_factor: self.branching_factor,
            });
        }

        let mut tree = Tree::with_arena(self.branching_factor, self.arena.clone())?;
        tree.layers_mut().record_layer(0, 1)?;

        let mut frontier = vec![Parent::Root];
        for (depth, &fanout) in fanouts.iter().enumerate() {
            let mut next = Vec::with_capacity(frontier.len().saturating_mul(fanout));
            for &parent in &frontier {
                for _ in 0..fanout {
                    let child = tree.create_node()?;
                    tree.insert_child(parent, child)?;
                    next.push(Parent::Node(child));
                }
            }
            if next.is_empty() {
                break;
            }
            tree.layers_mut().record_layer(depth + 1, next.len())?;
            debug!("layer {}: {} nodes", depth + 1, next.len());
            frontier = next;
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::ChildrenBearing;

    #[test]
    fn given_depth_zero_when_building_then_only_root_layer() {
        let mut tree = TreeBuilder::new(3).build_complete(0).unwrap();
        assert_eq!(tree.layers().remaining(), 1);
        assert_eq!(tree.next_layer_width(), Ok(1));
        assert_eq!(tree.child_count(), 0);
    }

    #[test]
    fn given_zero_fanout_when_building_then_stops_early() {
        let tree = TreeBuilder::new(2).build_layers(&[2, 0, 2]).unwrap();
        assert_eq!(tree.layers().iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn given_fanout_above_branching_when_building_then_capacity_exceeded() {
        let result = TreeBuilder::new(2).build_layers(&[2, 3]);
        assert!(matches!(
            result,
            Err(DomainError::CapacityExceeded {
                branching_factor: 2
            })
        ));
    }

    #[test]
    fn given_zero_branching_when_building_then_invalid() {
        let result = TreeBuilder::new(0).build_complete(2);
        assert!(matches!(result, Err(DomainError::InvalidBranchingFactor(0))));
    }
}
