//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree and arena contracts.
/// These are independent of configuration and CLI concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid branching factor: {0} (must be greater than zero)")]
    InvalidBranchingFactor(usize),

    #[error("invalid arena config: {0}")]
    InvalidArenaConfig(String),

    #[error("arena out of memory: requested {requested} bytes, capacity {capacity} bytes")]
    OutOfMemory { requested: usize, capacity: usize },

    #[error("node capacity exceeded: all {branching_factor} child slots occupied")]
    CapacityExceeded { branching_factor: usize },

    #[error("layer width tracker is empty")]
    Empty,

    #[error("layer recorded out of order: expected depth {expected}, got {got}")]
    LayerOutOfOrder { expected: usize, got: usize },

    #[error("node already has a parent: {0}")]
    AlreadyAttached(NodeId),

    #[error("cycle detected: {0} is an ancestor of the target parent")]
    CycleDetected(NodeId),

    #[error("stale node handle: {0}")]
    StaleHandle(NodeId),

    #[error("node handle belongs to a different tree: {0}")]
    ForeignHandle(NodeId),

    #[error("arena already released")]
    ArenaReleased,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
