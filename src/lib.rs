//! Arena-backed N-ary trees with a fixed branching factor.
//!
//! A [`Tree`](domain::Tree) owns a node arena and a layer-width tracker.
//! Nodes are addressed by handles validated against the arena that issued
//! them and are released all at once with [`Tree::free_tree`](domain::Tree::free_tree).
//!
//! ```
//! use cce_tree::domain::{DomainError, TreeBuilder};
//!
//! let mut tree = TreeBuilder::new(2).build_complete(2).unwrap();
//! assert_eq!(tree.next_layer_width(), Ok(1));
//! assert_eq!(tree.next_layer_width(), Ok(2));
//! assert_eq!(tree.next_layer_width(), Ok(4));
//! assert_eq!(tree.next_layer_width(), Err(DomainError::Empty));
//! tree.free_tree().unwrap();
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
