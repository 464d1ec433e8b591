//! Domain layer: the arena-backed tree, its layer tracker and builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod layers;
pub mod node;
pub mod render;
pub mod tree;

pub use arena::{ArenaConfig, ArenaId, ArenaStats, NodeArena};
pub use builder::TreeBuilder;
pub use error::{DomainError, DomainResult};
pub use layers::LayerWidths;
pub use node::{ChildSlots, Children, ChildrenBearing, NodeId, Parent, TreeNode};
pub use render::{TreeRender, MAX_RENDER_DEPTH};
pub use tree::Tree;
