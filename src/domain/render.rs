//! `termtree` rendering of trees.
//!
//! The display tree is built with an explicit stack. termtree formats and
//! drops recursively, so levels below [`MAX_RENDER_DEPTH`] are elided.

use termtree::Tree as Display;

use crate::domain::node::{Children, ChildrenBearing};
use crate::domain::tree::Tree;

/// Deepest level rendered; anything below shows as a single `…` leaf.
pub const MAX_RENDER_DEPTH: usize = 256;

const ELIDED: &str = "…";

pub trait TreeRender {
    fn to_tree_string(&self) -> Display<String>;
}

impl TreeRender for Tree {
    fn to_tree_string(&self) -> Display<String> {
        if self.is_released() {
            return Display::new("released tree".to_string());
        }

        let root = Display::new(format!("root (b={})", self.branching_factor()));
        let mut stack: Vec<(Display<String>, Children<'_>, usize)> =
            vec![(root, self.children(), 0)];

        loop {
            let next = stack
                .last_mut()
                .and_then(|(_, children, depth)| children.next().map(|id| (id, *depth + 1)));

            match next {
                Some((id, depth)) => {
                    let Ok(node) = self.node(id) else {
                        continue;
                    };
                    let label = format!(
                        "node {} [{}/{}]",
                        id.slot(),
                        node.child_count(),
                        self.branching_factor()
                    );
                    if depth >= MAX_RENDER_DEPTH && !node.is_leaf() {
                        let elided = Display::new(label).with_leaves([ELIDED.to_string()]);
                        if let Some((parent, _, _)) = stack.last_mut() {
                            parent.push(elided);
                        }
                    } else {
                        stack.push((Display::new(label), node.children(), depth));
                    }
                }
                None => {
                    let Some((done, _, _)) = stack.pop() else {
                        // The root frame is always returned before the stack empties.
                        return Display::new(String::new());
                    };
                    match stack.last_mut() {
                        Some((parent, _, _)) => {
                            parent.push(done);
                        }
                        None => return done,
                    }
                }
            }
        }
    }
}
