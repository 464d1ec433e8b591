//! Tree building service
//!
//! Builds a tree from settings, drains its layer widths in FIFO order and
//! reports node and arena accounting.

use tracing::{debug, info};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{ArenaConfig, ArenaStats, Tree, TreeBuilder};

/// What to build. Unset fields fall back to the service settings.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub branching_factor: Option<usize>,
    pub depth: Option<usize>,
    /// Per-layer fanouts; takes precedence over `depth`.
    pub fanouts: Option<Vec<usize>>,
}

/// Summary of a built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub branching_factor: usize,
    /// Layer widths drained from the tracker, root layer first.
    pub layer_widths: Vec<usize>,
    pub node_count: usize,
    pub leaf_count: usize,
    pub depth: usize,
    pub arena: ArenaStats,
}

/// Service for building and releasing trees.
pub struct TreeService {
    settings: Settings,
}

impl TreeService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build a tree and report on it.
    ///
    /// The tree's tracker is drained by the report; the tree itself is
    /// returned so callers can render it before releasing it.
    pub fn build(&self, request: &BuildRequest) -> ApplicationResult<(Tree, TreeReport)> {
        let branching_factor = request
            .branching_factor
            .unwrap_or(self.settings.tree.branching_factor);
        let builder =
            TreeBuilder::new(branching_factor).with_arena(ArenaConfig::from(&self.settings.arena));

        let mut tree = match &request.fanouts {
            Some(fanouts) => {
                debug!("build: b={branching_factor}, fanouts={fanouts:?}");
                builder.build_layers(fanouts)?
            }
            None => {
                let depth = request.depth.unwrap_or(self.settings.tree.depth);
                debug!("build: b={branching_factor}, depth={depth}");
                builder.build_complete(depth)?
            }
        };

        let report = Self::report(&mut tree)?;
        info!(
            "built tree: {} nodes over {} layers",
            report.node_count,
            report.layer_widths.len()
        );
        Ok((tree, report))
    }

    /// Drain the tracker in FIFO order and collect the tree's accounting.
    pub fn report(tree: &mut Tree) -> ApplicationResult<TreeReport> {
        let mut layer_widths = Vec::with_capacity(tree.layers().remaining());
        while !tree.layers().is_empty() {
            layer_widths.push(tree.next_layer_width()?);
        }
        Ok(TreeReport {
            branching_factor: tree.branching_factor(),
            layer_widths,
            node_count: tree.node_count(),
            leaf_count: tree.leaf_count(),
            depth: tree.depth(),
            arena: tree.arena().stats(),
        })
    }

    /// Free the tree, returning what the arena had outstanding.
    pub fn release(&self, tree: &mut Tree) -> ApplicationResult<ArenaStats> {
        let stats = tree.free_tree()?;
        debug!("release: {} bytes", stats.bytes_outstanding);
        Ok(stats)
    }
}
