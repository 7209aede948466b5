//! Defines `Node` and `NodeBuilder` for `Tree`.

use std::cmp::Ordering;
use std::mem;

use route::Route;
use tree::regex::ConstrainedCaptureRegex;
use tree::step::{Delimiter, Step};

/// The destination reference stored at a routable node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    destination: u32,
    captures: usize,
    route: String,
}

impl Terminal {
    /// Index of the destination this terminal resolves to.
    pub fn destination(&self) -> u32 {
        self.destination
    }

    /// Number of parameters captured along the path to this terminal.
    pub fn captures(&self) -> usize {
        self.captures
    }

    /// Text of the route that placed this terminal.
    pub fn route(&self) -> &str {
        &self.route
    }
}

/// The capture log a traversal writes spans into.
///
/// Traversal speculates: a static child or a parametric alternative may be
/// entered and later abandoned, so implementations must support rewinding to
/// an earlier mark. The no-op implementation on `()` lets a caller probe for
/// a match without recording anything.
pub(crate) trait Captures {
    fn mark(&self) -> usize;
    fn record(&mut self, start: usize, end: usize);
    fn rewind(&mut self, mark: usize);
}

impl Captures for () {
    fn mark(&self) -> usize {
        0
    }

    fn record(&mut self, _start: usize, _end: usize) {}

    fn rewind(&mut self, _mark: usize) {}
}

impl Captures for Vec<(usize, usize)> {
    fn mark(&self) -> usize {
        self.len()
    }

    fn record(&mut self, start: usize, end: usize) {
        self.push((start, end));
    }

    fn rewind(&mut self, mark: usize) {
        self.truncate(mark);
    }
}

/// A parametric alternative hanging off a `Node`.
///
/// The alternative captures a span ending at its delimiter (or at the end of
/// the input when the delimiter byte does not occur), optionally constrains
/// the span with an anchored regex, and continues into its own subtree.
pub struct CaptureNode {
    name: String,
    until: Delimiter,
    regex: Option<ConstrainedCaptureRegex>,
    inner: Node,
}

impl CaptureNode {
    /// The parameter name recorded when the alternative was first created.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the captured span ends.
    pub fn until(&self) -> Delimiter {
        self.until
    }

    /// The constraint applied to the captured span, if any.
    pub fn regex(&self) -> Option<&ConstrainedCaptureRegex> {
        self.regex.as_ref()
    }

    /// The subtree describing the continuation after the capture.
    pub fn inner(&self) -> &Node {
        &self.inner
    }
}

/// A recursive member of `Tree`, representative of a radix-compressed run of
/// literal bytes in one or more routes.
///
/// Each node holds the static children diverging after its prefix (mutually
/// exclusive by their leading byte), the parametric alternatives to fall
/// back on when no static child matches, and at most one terminal that
/// resolves the match once the input is exhausted.
pub struct Node {
    prefix: Vec<u8>,
    children: Vec<Node>,
    captures: Vec<CaptureNode>,
    terminal: Option<Terminal>,
}

impl Node {
    /// The literal bytes this node consumes.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// The static children, sorted by leading byte.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The parametric alternatives, in registration order.
    pub fn captures(&self) -> &[CaptureNode] {
        &self.captures
    }

    /// The terminal resolving at this node, if any.
    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    /// True if a route resolves at this node when the input is exhausted.
    pub fn is_routable(&self) -> bool {
        self.terminal.is_some()
    }

    /// Attempts to match `input` from the cursor `at` against this subtree.
    ///
    /// Children are tried in a most to least specific order: the static
    /// child dispatched on the next byte first, the parametric alternatives
    /// next (in registration order), and the terminal last, the latter only
    /// once the cursor has consumed the whole input. A speculative descent
    /// that fails rewinds the capture log before the next candidate is
    /// tried, so at most one parametric attempt is in flight per level at
    /// any time.
    pub(crate) fn traverse<'n, C>(
        &'n self,
        input: &[u8],
        at: usize,
        captures: &mut C,
    ) -> Option<&'n Terminal>
    where
        C: Captures,
    {
        let consumed = at + self.prefix.len();
        if consumed > input.len() || input[at..consumed] != self.prefix[..] {
            return None;
        }
        let at = consumed;

        if at < input.len() {
            let next = input[at];
            if let Ok(found) = self
                .children
                .binary_search_by(|child| child.prefix[0].cmp(&next))
            {
                let mark = captures.mark();
                if let Some(terminal) = self.children[found].traverse(input, at, captures) {
                    return Some(terminal);
                }
                captures.rewind(mark);
            }
        }

        for capture in &self.captures {
            let end = match capture.until {
                Delimiter::Byte(delimiter) => match input[at..].iter().position(|&b| b == delimiter)
                {
                    Some(found) => at + found,
                    None => input.len(),
                },
                Delimiter::EndOfInput => input.len(),
            };
            if let Some(ref regex) = capture.regex {
                if !regex.is_match(&input[at..end]) {
                    continue;
                }
            }
            let mark = captures.mark();
            captures.record(at, end);
            if let Some(terminal) = capture.inner.traverse(input, end, captures) {
                return Some(terminal);
            }
            captures.rewind(mark);
        }

        match self.terminal {
            Some(ref terminal) if at == input.len() => Some(terminal),
            _ => None,
        }
    }

    pub(crate) fn write_text(&self, out: &mut String, depth: usize, indent: usize) {
        let pad = " ".repeat(depth * indent);

        out.push_str(&pad);
        out.push('"');
        out.push_str(&String::from_utf8_lossy(&self.prefix));
        out.push('"');
        if let Some(ref terminal) = self.terminal {
            out.push_str(&format!(
                " -> {} ({})",
                terminal.destination, terminal.route
            ));
        }
        out.push('\n');

        for child in &self.children {
            child.write_text(out, depth + 1, indent);
        }
        for capture in &self.captures {
            out.push_str(&pad);
            out.push_str(&" ".repeat(indent));
            match capture.regex {
                Some(ref regex) => out.push_str(&format!(
                    "{{{}:{}:{}}}\n",
                    capture.name,
                    regex.as_str(),
                    capture.until
                )),
                None => out.push_str(&format!("{{{}::{}}}\n", capture.name, capture.until)),
            }
            capture.inner.write_text(out, depth + 2, indent);
        }
    }
}

struct CaptureNodeBuilder {
    name: String,
    until: Delimiter,
    regex: Option<ConstrainedCaptureRegex>,
    inner: NodeBuilder,
}

/// Constructs a `Node` which is sorted and immutable.
pub struct NodeBuilder {
    prefix: Vec<u8>,
    children: Vec<NodeBuilder>,
    captures: Vec<CaptureNodeBuilder>,
    terminal: Option<Terminal>,
}

impl NodeBuilder {
    /// Creates a new `NodeBuilder` with an empty prefix, suitable as the
    /// root of a tree under construction.
    pub fn new() -> NodeBuilder {
        NodeBuilder::with_prefix(Vec::new())
    }

    fn with_prefix(prefix: Vec<u8>) -> NodeBuilder {
        NodeBuilder {
            prefix,
            children: Vec::new(),
            captures: Vec::new(),
            terminal: None,
        }
    }

    /// Merges `route` into this subtree, resolving to the destination index.
    ///
    /// When the route lands on a node that is already routable the earlier
    /// registration wins and the newcomer is shadowed.
    pub fn add_route(&mut self, route: &Route, destination: u32) {
        trace!(
            " merging route `{}` for destination {}",
            route.text(),
            destination
        );
        let terminal = Terminal {
            destination,
            captures: route.captures(),
            route: route.text().to_string(),
        };
        self.insert(route.steps(), terminal);
    }

    fn insert(&mut self, steps: &[Step], terminal: Terminal) {
        let (step, rest) = match steps.split_first() {
            Some(split) => split,
            None => return self.set_terminal(terminal),
        };

        match *step {
            Step::Static { ref literal } => self.insert_literal(literal, rest, terminal),
            Step::Dynamic { ref name, until } => {
                self.capture_for(name, until, None).insert(rest, terminal)
            }
            Step::Constrained {
                ref name,
                ref regex,
                until,
            } => self
                .capture_for(name, until, Some(regex))
                .insert(rest, terminal),
        }
    }

    // Descends the radix structure along `literal`, splitting an existing
    // child's prefix at the divergence point when required.
    fn insert_literal(&mut self, literal: &[u8], rest: &[Step], terminal: Terminal) {
        if literal.is_empty() {
            return self.insert(rest, terminal);
        }

        let position = self
            .children
            .iter()
            .position(|child| child.prefix[0] == literal[0]);
        let position = match position {
            Some(position) => position,
            None => {
                let mut child = NodeBuilder::with_prefix(literal.to_vec());
                child.insert(rest, terminal);
                self.children.push(child);
                return;
            }
        };

        let common = common_prefix(&self.children[position].prefix, literal);
        if common < self.children[position].prefix.len() {
            self.children[position].split(common);
        }

        let child = &mut self.children[position];
        if common == literal.len() {
            child.insert(rest, terminal);
        } else {
            child.insert_literal(&literal[common..], rest, terminal);
        }
    }

    // Splits this node's prefix at `at`, demoting everything it currently
    // holds into a single child carrying the prefix tail.
    fn split(&mut self, at: usize) {
        let tail_prefix = self.prefix.split_off(at);
        let tail = NodeBuilder {
            prefix: tail_prefix,
            children: mem::replace(&mut self.children, Vec::new()),
            captures: mem::replace(&mut self.captures, Vec::new()),
            terminal: self.terminal.take(),
        };
        self.children.push(tail);
    }

    // Finds or creates the parametric alternative matching the step shape.
    // Shape equality ignores the name: captures are positional, so two
    // routes spelling the same capture differently share one alternative.
    fn capture_for(
        &mut self,
        name: &str,
        until: Delimiter,
        regex: Option<&ConstrainedCaptureRegex>,
    ) -> &mut NodeBuilder {
        let found = self.captures.iter().position(|capture| {
            capture.until == until
                && capture.regex.as_ref().map(|r| r.as_str()) == regex.map(|r| r.as_str())
        });
        let index = match found {
            Some(index) => index,
            None => {
                self.captures.push(CaptureNodeBuilder {
                    name: name.to_string(),
                    until,
                    regex: regex.cloned(),
                    inner: NodeBuilder::new(),
                });
                self.captures.len() - 1
            }
        };
        &mut self.captures[index].inner
    }

    fn set_terminal(&mut self, terminal: Terminal) {
        match self.terminal {
            Some(ref existing) => warn!(
                " route `{}` is shadowed by earlier route `{}` and will never match",
                terminal.route, existing.route
            ),
            None => self.terminal = Some(terminal),
        }
    }

    /// Finalizes and sorts all internal data, including all children.
    pub fn finalize(mut self) -> Node {
        self.children.sort();

        let mut children = self
            .children
            .drain(..)
            .map(|child| child.finalize())
            .collect::<Vec<Node>>();
        children.shrink_to_fit();

        let mut captures = self
            .captures
            .drain(..)
            .map(|capture| CaptureNode {
                name: capture.name,
                until: capture.until,
                regex: capture.regex,
                inner: capture.inner.finalize(),
            })
            .collect::<Vec<CaptureNode>>();
        captures.shrink_to_fit();

        let mut prefix = self.prefix;
        prefix.shrink_to_fit();

        Node {
            prefix,
            children,
            captures,
            terminal: self.terminal,
        }
    }
}

impl Ord for NodeBuilder {
    /// Orders siblings by prefix; leading bytes are unique among siblings,
    /// so this is the byte-dispatch order the finalized node relies on.
    fn cmp(&self, other: &NodeBuilder) -> Ordering {
        self.prefix.cmp(&other.prefix)
    }
}

impl PartialOrd for NodeBuilder {
    fn partial_cmp(&self, other: &NodeBuilder) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeBuilder {
    fn eq(&self, other: &NodeBuilder) -> bool {
        self.prefix == other.prefix
    }
}

impl Eq for NodeBuilder {}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b.iter())
        .take_while(|&(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pattern;

    fn node_with(patterns: &[&str]) -> Node {
        let mut root = NodeBuilder::new();
        for (index, pattern) in patterns.iter().enumerate() {
            let route = pattern::parse(pattern, b'/').unwrap();
            root.add_route(&route, index as u32);
        }
        root.finalize()
    }

    fn destination_of(node: &Node, input: &[u8]) -> Option<u32> {
        node.traverse(input, 0, &mut ())
            .map(|terminal| terminal.destination())
    }

    #[test]
    fn splits_shared_prefixes() {
        let root = node_with(&["GET /ping", "GET /pong"]);

        assert_eq!(root.prefix(), b"");
        assert_eq!(root.children().len(), 1);

        let shared = &root.children()[0];
        assert_eq!(shared.prefix(), b"GET /p");
        assert!(!shared.is_routable());
        assert_eq!(shared.children().len(), 2);
        assert_eq!(shared.children()[0].prefix(), b"ing");
        assert_eq!(shared.children()[1].prefix(), b"ong");
        assert!(shared.children()[0].is_routable());
        assert!(shared.children()[1].is_routable());
    }

    #[test]
    fn prefixes_reconstruct_the_literal_path() {
        let root = node_with(&["GET /ping", "GET /pong", "GET /pin"]);

        // Walking "GET /p" -> "in" -> "g" must reassemble "GET /ping".
        let mut text = Vec::new();
        let mut node = &root.children()[0];
        text.extend_from_slice(node.prefix());
        while !node.children().is_empty() {
            node = &node.children()[0];
            text.extend_from_slice(node.prefix());
        }
        assert_eq!(text, b"GET /ping".to_vec());
    }

    #[test]
    fn dispatches_on_the_next_byte() {
        let root = node_with(&["GET /ping", "GET /pong"]);

        assert_eq!(destination_of(&root, b"GET /ping"), Some(0));
        assert_eq!(destination_of(&root, b"GET /pong"), Some(1));
        assert_eq!(destination_of(&root, b"GET /pin"), None);
        assert_eq!(destination_of(&root, b"GET /pings"), None);
    }

    #[test]
    fn captures_rewind_when_a_descent_fails() {
        // Distinct shapes, so the node carries two alternatives. The first
        // records its span, dies in its subtree, and must rewind before the
        // second alternative records the same span.
        let root = node_with(&["GET /{a:[a-z]+}/x", "GET /{b}/y"]);

        let mut spans = Vec::new();
        let terminal = root.traverse(b"GET /q/y", 0, &mut spans).unwrap();
        assert_eq!(terminal.destination(), 1);
        assert_eq!(spans, vec![(5, 6)]);
    }

    #[test]
    fn static_children_win_over_captures() {
        let root = node_with(&["GET /{name}", "GET /exact"]);

        assert_eq!(destination_of(&root, b"GET /exact"), Some(1));
        assert_eq!(destination_of(&root, b"GET /other"), Some(0));
    }

    #[test]
    fn falls_back_to_the_capture_when_the_static_subtree_dies() {
        let root = node_with(&["GET /users/me/inbox", "GET /users/{id}/posts"]);

        assert_eq!(destination_of(&root, b"GET /users/me/inbox"), Some(0));
        // "me" descends the static child first, fails at "/posts", and must
        // come back out to the capture alternative.
        assert_eq!(destination_of(&root, b"GET /users/me/posts"), Some(1));
    }

    #[test]
    fn alternatives_are_tried_in_registration_order() {
        let root = node_with(&["GET /users/{id:[0-9]+}", "GET /users/{id}"]);

        let shared = &root.children()[0];
        assert_eq!(shared.captures().len(), 2);
        assert!(shared.captures()[0].regex().is_some());
        assert!(shared.captures()[1].regex().is_none());

        assert_eq!(destination_of(&root, b"GET /users/42"), Some(0));
        assert_eq!(destination_of(&root, b"GET /users/alice"), Some(1));
    }

    #[test]
    fn structurally_equal_captures_share_a_subtree() {
        let root = node_with(&["GET /users/{id}/posts", "GET /users/{uid}/pics"]);

        let shared = &root.children()[0];
        assert_eq!(shared.captures().len(), 1);
        assert_eq!(shared.captures()[0].name(), "id");

        assert_eq!(destination_of(&root, b"GET /users/7/posts"), Some(0));
        assert_eq!(destination_of(&root, b"GET /users/7/pics"), Some(1));
    }

    #[test]
    fn shadowed_terminals_keep_the_first_registration() {
        let root = node_with(&["GET /dup", "GET /dup"]);

        assert_eq!(destination_of(&root, b"GET /dup"), Some(0));
    }

    #[test]
    fn terminals_require_exhausted_input() {
        let root = node_with(&["GET /users/{id}"]);

        assert_eq!(destination_of(&root, b"GET /users/123"), Some(0));
        assert_eq!(destination_of(&root, b"GET /users/123/"), None);
    }

    #[test]
    fn rest_captures_swallow_the_remainder() {
        let root = node_with(&["GET /static/{path::\\n}"]);

        let mut spans = Vec::new();
        let terminal = root.traverse(b"GET /static/a/b/c.txt", 0, &mut spans).unwrap();
        assert_eq!(terminal.destination(), 0);
        assert_eq!(spans, vec![(12, 21)]);

        // A rest capture may be empty.
        let mut spans = Vec::new();
        assert!(root.traverse(b"GET /static/", 0, &mut spans).is_some());
        assert_eq!(spans, vec![(12, 12)]);
    }

    #[test]
    fn text_dump_mentions_every_route() {
        let root = node_with(&["GET /ping", "GET /users/{id:[0-9]+}"]);
        let mut out = String::new();
        root.write_text(&mut out, 0, 2);

        assert!(out.contains("GET /ping"));
        assert!(out.contains("{id:[0-9]+:/}"));
    }
}
