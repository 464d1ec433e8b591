//! Per-layer node counts, recorded in depth order and drained FIFO.

use std::collections::VecDeque;

use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};

/// FIFO of layer widths: entry `i` is the number of nodes at depth `i`.
///
/// Layers are recorded in depth order; consumers drain them in the same
/// order with [`next_layer_width`](Self::next_layer_width).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerWidths {
    widths: VecDeque<usize>,
    recorded: usize,
}

impl LayerWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the width of the next layer and returns that layer's depth.
    pub fn record_layer_width(&mut self, count: usize) -> usize {
        let depth = self.recorded;
        self.widths.push_back(count);
        self.recorded += 1;
        trace!("layer {depth}: width {count}");
        depth
    }

    /// Appends the width of layer `depth`, which must be the next one expected.
    pub fn record_layer(&mut self, depth: usize, count: usize) -> DomainResult<()> {
        if depth != self.recorded {
            return Err(DomainError::LayerOutOfOrder {
                expected: self.recorded,
                got: depth,
            });
        }
        self.record_layer_width(count);
        Ok(())
    }

    /// Removes and returns the oldest recorded width.
    pub fn next_layer_width(&mut self) -> DomainResult<usize> {
        self.widths.pop_front().ok_or(DomainError::Empty)
    }

    pub fn peek(&self) -> Option<usize> {
        self.widths.front().copied()
    }

    /// Widths recorded but not yet drained.
    pub fn remaining(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Total layers recorded since creation or the last [`clear`](Self::clear),
    /// drained ones included. This is the depth the next record gets.
    pub fn layers_recorded(&self) -> usize {
        self.recorded
    }

    /// Undrained widths, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.widths.iter().copied()
    }

    /// Drains every remaining width in FIFO order.
    pub fn drain_all(&mut self) -> Vec<usize> {
        self.widths.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.widths.clear();
        self.recorded = 0;
    }
}

impl Extend<usize> for LayerWidths {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for count in iter {
            self.record_layer_width(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_recorded_widths_when_draining_then_fifo_order() {
        let mut layers = LayerWidths::new();
        layers.extend([2, 4, 8]);

        assert_eq!(layers.next_layer_width(), Ok(2));
        assert_eq!(layers.next_layer_width(), Ok(4));
        assert_eq!(layers.next_layer_width(), Ok(8));
        assert_eq!(layers.next_layer_width(), Err(DomainError::Empty));
    }

    #[test]
    fn given_drained_layers_when_recording_then_depth_keeps_counting() {
        let mut layers = LayerWidths::new();
        assert_eq!(layers.record_layer_width(1), 0);
        layers.next_layer_width().unwrap();

        assert_eq!(layers.record_layer_width(3), 1);
        assert_eq!(layers.remaining(), 1);
        assert_eq!(layers.layers_recorded(), 2);
    }

    #[test]
    fn given_skipped_depth_when_recording_then_out_of_order() {
        let mut layers = LayerWidths::new();
        layers.record_layer(0, 1).unwrap();

        let result = layers.record_layer(2, 4);

        assert_eq!(
            result,
            Err(DomainError::LayerOutOfOrder {
                expected: 1,
                got: 2
            })
        );
        assert_eq!(layers.remaining(), 1);
    }

    #[test]
    fn given_layers_when_cleared_then_depth_restarts() {
        let mut layers = LayerWidths::new();
        layers.extend([1, 2]);
        layers.clear();

        assert!(layers.is_empty());
        assert_eq!(layers.peek(), None);
        assert!(layers.record_layer(0, 1).is_ok());
    }
}
