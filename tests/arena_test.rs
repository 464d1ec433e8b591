//! Tests for NodeArena growth, caps and bulk release

use rstest::rstest;

use cce_tree::domain::{
    ArenaConfig, ArenaStats, ChildrenBearing, DomainError, NodeArena, TreeNode,
};

#[rstest]
#[case(4, 5, 2)]
#[case(4, 4, 1)]
#[case(1, 3, 3)]
#[case(8, 17, 3)]
fn given_block_size_when_allocating_then_grows_by_blocks(
    #[case] block_nodes: usize,
    #[case] allocations: usize,
    #[case] expected_blocks: usize,
) {
    let mut arena = NodeArena::new(ArenaConfig::new(block_nodes)).unwrap();
    for _ in 0..allocations {
        arena.allocate(TreeNode::new(2).unwrap()).unwrap();
    }
    assert_eq!(arena.stats().blocks, expected_blocks);
    assert_eq!(arena.len(), allocations);
}

#[test]
fn given_single_block_cap_when_fifth_allocation_then_out_of_memory() {
    let mut arena = NodeArena::new(ArenaConfig::capped(4, 1)).unwrap();
    for _ in 0..4 {
        arena.allocate(TreeNode::new(2).unwrap()).unwrap();
    }

    let err = arena.allocate(TreeNode::new(2).unwrap()).unwrap_err();

    assert!(matches!(err, DomainError::OutOfMemory { .. }));
    assert!(err.to_string().contains("out of memory"));
    assert_eq!(arena.stats().blocks, 1);
}

#[test]
fn given_capped_arena_when_under_cap_then_grows_until_cap() {
    let config = ArenaConfig::capped(2, 3);
    assert_eq!(config.max_nodes(), Some(6));
    let mut arena = NodeArena::new(config).unwrap();

    for _ in 0..6 {
        arena.allocate(TreeNode::new(1).unwrap()).unwrap();
    }
    assert_eq!(arena.stats().blocks, 3);
    assert!(arena.allocate(TreeNode::new(1).unwrap()).is_err());
}

#[test]
fn given_allocations_when_accounting_then_bytes_track_footprints() {
    let mut arena = NodeArena::new(ArenaConfig::default()).unwrap();
    let small = TreeNode::new(1).unwrap().footprint();
    let large = TreeNode::new(8).unwrap().footprint();

    arena.allocate(TreeNode::new(1).unwrap()).unwrap();
    arena.allocate(TreeNode::new(8).unwrap()).unwrap();

    assert_eq!(arena.bytes_outstanding(), small + large);
}

#[test]
fn given_allocated_handles_when_resolved_then_return_fresh_nodes() {
    let mut arena = NodeArena::new(ArenaConfig::new(2)).unwrap();
    let ids: Vec<_> = (0..5)
        .map(|_| arena.allocate(TreeNode::new(3).unwrap()).unwrap())
        .collect();

    for id in ids {
        let node = arena.get(id).unwrap();
        assert!(node.is_leaf());
        assert!(node.parent().is_none());
        assert_eq!(node.child_count(), 0);
    }
}

#[test]
fn given_released_arena_when_allocating_then_arena_released() {
    let mut arena = NodeArena::new(ArenaConfig::default()).unwrap();
    arena.allocate(TreeNode::new(2).unwrap()).unwrap();

    arena.release_all().unwrap();

    assert_eq!(arena.stats(), ArenaStats::default());
    assert_eq!(
        arena.allocate(TreeNode::new(2).unwrap()),
        Err(DomainError::ArenaReleased)
    );
    assert!(arena.is_empty());
}
