//! Block-grown node arena with bulk-only release.
//!
//! Nodes live in a [`generational_arena::Arena`] that grows one block of
//! `block_nodes` slots at a time, up to an optional block cap. Individual
//! nodes are never freed; the whole arena is released at once by
//! [`NodeArena::release_all`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{NodeId, TreeNode};

/// Process-unique identity of a [`NodeArena`], embedded in every [`NodeId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arena {}", self.0)
    }
}

/// Growth policy of a [`NodeArena`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Node slots added per block. Must be greater than zero.
    pub block_nodes: usize,
    /// Maximum number of blocks, `None` for unbounded growth.
    ///
    /// When the cap is reached, allocation fails with
    /// [`DomainError::OutOfMemory`] instead of growing.
    pub max_blocks: Option<usize>,
}

impl ArenaConfig {
    /// Default block size in node slots.
    pub const DEFAULT_BLOCK_NODES: usize = 1024;

    /// Unbounded arena growing by `block_nodes` slots at a time.
    pub fn new(block_nodes: usize) -> Self {
        Self {
            block_nodes,
            max_blocks: None,
        }
    }

    /// Arena that holds at most `block_nodes * max_blocks` nodes.
    pub fn capped(block_nodes: usize, max_blocks: usize) -> Self {
        Self {
            block_nodes,
            max_blocks: Some(max_blocks),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.block_nodes == 0 {
            return Err(DomainError::InvalidArenaConfig(
                "block_nodes must be greater than zero".into(),
            ));
        }
        if self.max_blocks == Some(0) {
            return Err(DomainError::InvalidArenaConfig(
                "max_blocks must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Upper bound on live nodes, if the arena is capped.
    pub fn max_nodes(&self) -> Option<usize> {
        self.max_blocks
            .map(|blocks| blocks.saturating_mul(self.block_nodes))
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_NODES)
    }
}

/// Allocator accounting snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Blocks currently backing the arena.
    pub blocks: usize,
    /// Node slots across all blocks.
    pub capacity_nodes: usize,
    /// Slots physically reserved; may run ahead of `capacity_nodes`.
    pub reserved_nodes: usize,
    /// Nodes handed out so far.
    pub allocated_nodes: usize,
    /// Bytes charged for the allocated nodes.
    pub bytes_outstanding: usize,
}

/// Node storage owned by a single tree.
#[derive(Debug)]
pub struct NodeArena {
    id: ArenaId,
    config: ArenaConfig,
    /// `None` once released.
    nodes: Option<Arena<TreeNode>>,
    blocks: usize,
    bytes_outstanding: usize,
}

impl NodeArena {
    /// Creates an arena and pre-allocates its first block.
    pub fn new(config: ArenaConfig) -> DomainResult<Self> {
        config.validate()?;
        let id = ArenaId::next();
        debug!(
            "{id}: block_nodes={}, max_blocks={:?}",
            config.block_nodes, config.max_blocks
        );
        Ok(Self {
            id,
            nodes: Some(Arena::with_capacity(config.block_nodes)),
            config,
            blocks: 1,
            bytes_outstanding: 0,
        })
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Stores `node` and returns its handle.
    ///
    /// Opens a new block when the current blocks are full. Fails with
    /// [`DomainError::OutOfMemory`] when the block cap is reached and with
    /// [`DomainError::ArenaReleased`] after [`release_all`](Self::release_all).
    ///
    /// Blocks are a logical unit. Backing storage at least doubles when it
    /// has to grow, so small blocks do not copy the slot vector every time.
    #[instrument(level = "trace", skip(self, node), fields(arena = %self.id))]
    pub fn allocate(&mut self, node: TreeNode) -> DomainResult<NodeId> {
        let requested = node.footprint();
        let nodes = self.nodes.as_mut().ok_or(DomainError::ArenaReleased)?;
        let block_nodes = self.config.block_nodes;

        if nodes.len() >= self.blocks.saturating_mul(block_nodes) {
            // No per-node free, so outstanding bytes cover every slot in use.
            if let Some(max_blocks) = self.config.max_blocks {
                if self.blocks >= max_blocks {
                    return Err(DomainError::OutOfMemory {
                        requested,
                        capacity: self.bytes_outstanding,
                    });
                }
            }
            self.blocks += 1;

            let needed = self.blocks.saturating_mul(block_nodes);
            let reserved = nodes.capacity();
            if reserved < needed {
                let mut target = needed.max(reserved.saturating_mul(2));
                if let Some(max_nodes) = self.config.max_nodes() {
                    target = target.min(max_nodes);
                }
                nodes.reserve(target - reserved);
            }
            debug!(
                "{}: grew to {} blocks ({} slots reserved)",
                self.id,
                self.blocks,
                nodes.capacity()
            );
        }

        let index = nodes
            .try_insert(node)
            .map_err(|_| DomainError::OutOfMemory {
                requested,
                capacity: self.bytes_outstanding,
            })?;
        self.bytes_outstanding += requested;
        Ok(NodeId::new(self.id, index))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: NodeId) -> DomainResult<&TreeNode> {
        let nodes = self.nodes.as_ref().ok_or(DomainError::ArenaReleased)?;
        if id.arena != self.id {
            return Err(DomainError::ForeignHandle(id));
        }
        nodes.get(id.index).ok_or(DomainError::StaleHandle(id))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_mut(&mut self, id: NodeId) -> DomainResult<&mut TreeNode> {
        let nodes = self.nodes.as_mut().ok_or(DomainError::ArenaReleased)?;
        if id.arena != self.id {
            return Err(DomainError::ForeignHandle(id));
        }
        nodes.get_mut(id.index).ok_or(DomainError::StaleHandle(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of nodes handed out.
    pub fn len(&self) -> usize {
        self.nodes.as_ref().map_or(0, Arena::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_released(&self) -> bool {
        self.nodes.is_none()
    }

    pub fn bytes_outstanding(&self) -> usize {
        self.bytes_outstanding
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            blocks: self.blocks,
            capacity_nodes: self.blocks.saturating_mul(self.config.block_nodes),
            reserved_nodes: self.nodes.as_ref().map_or(0, Arena::capacity),
            allocated_nodes: self.len(),
            bytes_outstanding: self.bytes_outstanding,
        }
    }

    /// Drops every block at once and returns what was outstanding.
    ///
    /// All handles issued by this arena are invalid afterwards. A second call
    /// fails with [`DomainError::ArenaReleased`].
    #[instrument(level = "debug", skip(self), fields(arena = %self.id))]
    pub fn release_all(&mut self) -> DomainResult<ArenaStats> {
        let stats = self.stats();
        if self.nodes.take().is_none() {
            return Err(DomainError::ArenaReleased);
        }
        self.blocks = 0;
        self.bytes_outstanding = 0;
        debug!(
            "{}: released {} nodes, {} bytes",
            self.id, stats.allocated_nodes, stats.bytes_outstanding
        );
        Ok(stats)
    }
}
