//! Defines `Matcher`, the compiled artifact that answers match queries.

use route::Destination;
use tree::node::Captures;
use tree::Tree;

/// The compiled, immutable artifact produced by `Router::compile`.
///
/// A matcher owns the decision tree, the destinations and their payloads. It
/// holds no mutable state, so a single instance can serve any number of
/// threads at once without coordination; sharing one behind an `Arc` is the
/// expected deployment shape.
///
/// `find` runs in time proportional to the input length. A miss performs no
/// heap allocation at all; a hit allocates one vector of parameter slices,
/// sized to the winning route.
pub struct Matcher<T> {
    tree: Tree,
    destinations: Vec<Destination<T>>,
}

impl<T> Matcher<T> {
    pub(crate) fn new(tree: Tree, destinations: Vec<Destination<T>>) -> Matcher<T> {
        Matcher { tree, destinations }
    }

    /// Applies the matcher to `input`.
    ///
    /// Returns the winning destination and the captured parameters in
    /// pattern order, or `None` when no registered route matches. The
    /// absence of a match is a value, not a failure: this call has no error
    /// channel and never panics.
    pub fn find<'m, 'i>(&'m self, input: &'i [u8]) -> Option<Match<'m, 'i, T>> {
        // Probe with the no-op capture log first; only a hit pays for the
        // collecting pass and its one allocation.
        let captures = self.tree.traverse(input, &mut ())?.captures();

        let mut collector = SpanCollector {
            input,
            params: Vec::with_capacity(captures),
        };
        let terminal = self.tree.traverse(input, &mut collector)?;

        Some(Match {
            destination: &self.destinations[terminal.destination() as usize],
            params: collector.params,
        })
    }

    /// The destinations this matcher resolves to, in insertion order.
    pub fn destinations(&self) -> &[Destination<T>] {
        &self.destinations
    }

    /// Borrows the decision tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Renders the decision tree, indented `indent` spaces per level.
    /// Advisory and unstable, like `Tree::to_text`.
    pub fn to_text(&self, indent: usize) -> String {
        self.tree.to_text(indent)
    }
}

/// A successful match: the winning destination plus the captured parameters.
pub struct Match<'m, 'i, T: 'm> {
    destination: &'m Destination<T>,
    params: Vec<&'i [u8]>,
}

impl<'m, 'i, T: 'm> Match<'m, 'i, T> {
    /// The payload registered for the winning destination.
    pub fn payload(&self) -> &'m T {
        self.destination.payload()
    }

    /// The winning destination.
    pub fn destination(&self) -> &'m Destination<T> {
        self.destination
    }

    /// The captured parameter spans, in pattern order.
    pub fn params(&self) -> &[&'i [u8]] {
        &self.params
    }

    /// Consumes the match, returning the captured parameter spans.
    pub fn into_params(self) -> Vec<&'i [u8]> {
        self.params
    }
}

// Resolves recorded spans into input slices as traversal goes, so a hit
// finishes with the parameter vector already built.
struct SpanCollector<'i> {
    input: &'i [u8],
    params: Vec<&'i [u8]>,
}

impl<'i> Captures for SpanCollector<'i> {
    fn mark(&self) -> usize {
        self.params.len()
    }

    fn record(&mut self, start: usize, end: usize) {
        self.params.push(&self.input[start..end]);
    }

    fn rewind(&mut self, mark: usize) {
        self.params.truncate(mark);
    }
}
