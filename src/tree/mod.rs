//! Defines a hierarchical `Tree` with subtrees of `Node`.
//!
//! The tree is the decision structure every registered route is merged into:
//! radix-compressed literal runs branch on their first diverging byte, and
//! parametric steps hang off the node they follow as ordered fallback
//! alternatives. A `TreeBuilder` accumulates routes and `finalize` produces
//! the immutable `Tree` a `Matcher` traverses.

pub mod node;
pub mod regex;
pub mod step;

use route::Route;

use self::node::{Captures, NodeBuilder};
pub use self::node::{CaptureNode, Node, Terminal};

/// An immutable decision structure mapping inputs to destination indices.
///
/// Trees are materialized from the registered routes by `Router::tree` (for
/// introspection) or `Router::compile` (for matching), and never change
/// afterwards.
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Borrows the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Attempts to resolve `input` to a terminal, writing captured spans
    /// into the supplied log.
    pub(crate) fn traverse<'t, C>(&'t self, input: &[u8], captures: &mut C) -> Option<&'t Terminal>
    where
        C: Captures,
    {
        self.root.traverse(input, 0, captures)
    }

    /// Renders a human-readable dump of the tree, indented `indent` spaces
    /// per level. The format is advisory and unstable.
    pub fn to_text(&self, indent: usize) -> String {
        let mut out = String::new();
        self.root.write_text(&mut out, 0, indent);
        out
    }
}

/// Constructs a `Tree` by merging routes, one destination at a time.
pub struct TreeBuilder {
    root: NodeBuilder,
}

impl TreeBuilder {
    /// Creates a new `TreeBuilder` with an empty root.
    pub fn new() -> TreeBuilder {
        trace!(" creating new tree builder");
        TreeBuilder {
            root: NodeBuilder::new(),
        }
    }

    /// Merges `route` into the tree, resolving to the destination index.
    pub fn add_route(&mut self, route: &Route, destination: u32) {
        self.root.add_route(route, destination);
    }

    /// Finalizes and sorts all internal data, yielding the immutable `Tree`.
    pub fn finalize(self) -> Tree {
        trace!(" finalizing tree");
        Tree {
            root: self.root.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pattern;

    #[test]
    fn builds_and_traverses() {
        let mut builder = TreeBuilder::new();
        builder.add_route(&pattern::parse("GET /ping", b'/').unwrap(), 0);
        builder.add_route(&pattern::parse("GET /users/{id}", b'/').unwrap(), 1);
        let tree = builder.finalize();

        assert_eq!(
            tree.traverse(b"GET /ping", &mut ()).map(|t| t.destination()),
            Some(0)
        );
        assert_eq!(
            tree.traverse(b"GET /users/7", &mut ()).map(|t| t.destination()),
            Some(1)
        );
        assert_eq!(tree.traverse(b"GET /nope", &mut ()).map(|t| t.destination()), None);
    }

    #[test]
    fn dump_is_indented() {
        let mut builder = TreeBuilder::new();
        builder.add_route(&pattern::parse("GET /ping", b'/').unwrap(), 0);
        let tree = builder.finalize();

        let text = tree.to_text(2);
        assert!(text.starts_with("\"\"\n"));
        assert!(text.contains("  \"GET /ping\" -> 0 (GET /ping)"));
    }
}
