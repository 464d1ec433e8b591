//! Tests for the layer-width tracker on its own and through a tree

use rstest::rstest;

use cce_tree::domain::{DomainError, LayerWidths, Tree};

#[test]
fn given_three_layers_when_draining_then_fifo_then_empty() {
    let mut tree = Tree::new(2).unwrap();
    tree.record_layer_width(2).unwrap();
    tree.record_layer_width(4).unwrap();
    tree.record_layer_width(8).unwrap();

    assert_eq!(tree.next_layer_width(), Ok(2));
    assert_eq!(tree.next_layer_width(), Ok(4));
    assert_eq!(tree.next_layer_width(), Ok(8));
    assert_eq!(tree.next_layer_width(), Err(DomainError::Empty));
}

#[test]
fn given_fresh_tree_when_draining_then_empty() {
    let mut tree = Tree::new(4).unwrap();
    assert_eq!(tree.next_layer_width(), Err(DomainError::Empty));
}

#[rstest]
#[case(0, 1, Ok(()))]
#[case(2, 1, Err(DomainError::LayerOutOfOrder { expected: 0, got: 2 }))]
fn given_empty_tracker_when_recording_layer_then_depth_checked(
    #[case] depth: usize,
    #[case] count: usize,
    #[case] expected: Result<(), DomainError>,
) {
    let mut layers = LayerWidths::new();
    assert_eq!(layers.record_layer(depth, count), expected);
}

#[test]
fn given_interleaved_record_and_drain_when_recording_then_order_preserved() {
    let mut layers = LayerWidths::new();
    layers.record_layer(0, 1).unwrap();
    assert_eq!(layers.next_layer_width(), Ok(1));

    layers.record_layer(1, 3).unwrap();
    layers.record_layer(2, 9).unwrap();

    assert_eq!(layers.peek(), Some(3));
    assert_eq!(layers.drain_all(), vec![3, 9]);
    assert!(layers.is_empty());
    assert_eq!(
        layers.record_layer(1, 5),
        Err(DomainError::LayerOutOfOrder {
            expected: 3,
            got: 1
        })
    );
}

#[test]
fn given_cleared_tracker_when_recording_then_depth_restarts() {
    let mut layers = LayerWidths::new();
    layers.extend([1, 2]);
    layers.clear();

    assert_eq!(layers.layers_recorded(), 0);
    assert!(layers.record_layer(0, 1).is_ok());
}
