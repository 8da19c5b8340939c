//! Documentation surface consumed by renderers.

use restdoc_domain::{Example, HttpMethod};
use serde::Serialize;

/// Documentation of one node and, recursively, its children.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDoc {
    /// The node's own path relative to its parent.
    pub path: Option<String>,
    /// The node's path from the root of the tree.
    pub full_path: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Own handlers in registration order.
    pub handlers: Vec<HandlerDoc>,
    /// Children in insertion order.
    pub children: Vec<NodeDoc>,
}

/// Documentation of one handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDoc {
    /// HTTP method.
    pub method: HttpMethod,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Examples in declaration order.
    pub examples: Vec<Example>,
}

impl NodeDoc {
    /// Number of examples in this node and all descendants.
    #[must_use]
    pub fn example_count(&self) -> usize {
        self.handlers.iter().map(|h| h.examples.len()).sum::<usize>()
            + self.children.iter().map(Self::example_count).sum::<usize>()
    }

    /// Depth-first iterator over this node and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}
