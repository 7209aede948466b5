//! Defines `Router`, the destination registry and build-phase surface.

use matcher::Matcher;
use pattern::{self, ParseError};
use route::Destination;
use tree::{Tree, TreeBuilder};

/// Options governing pattern parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouterOptions {
    default_until: u8,
}

impl RouterOptions {
    /// Replaces the delimiter used by parameters that neither name one
    /// explicitly nor are followed by a literal step. Defaults to `'/'`.
    pub fn default_until(mut self, delimiter: u8) -> RouterOptions {
        self.default_until = delimiter;
        self
    }
}

impl Default for RouterOptions {
    fn default() -> RouterOptions {
        RouterOptions {
            default_until: b'/',
        }
    }
}

/// The destination registry.
///
/// A `Router` accumulates destinations during the build phase and compiles
/// them into an immutable `Matcher`. Registration order is significant: it
/// assigns the dense destination indices and is the final tiebreaker when
/// two routes can match the same input.
///
/// ```rust
/// extern crate shunt;
///
/// use shunt::Router;
///
/// # fn main() {
/// let mut router = Router::new();
/// let ping = router.add("GET /ping", 1).unwrap();
/// let pong = router.add("GET /pong", 2).unwrap();
/// assert_eq!((ping, pong), (0, 1));
///
/// let matcher = router.compile();
/// assert_eq!(matcher.find(b"GET /pong").map(|m| *m.payload()), Some(2));
/// # }
/// ```
pub struct Router<T> {
    options: RouterOptions,
    destinations: Vec<Destination<T>>,
}

impl<T> Router<T> {
    /// Creates a router with default options.
    pub fn new() -> Router<T> {
        Router::with_options(RouterOptions::default())
    }

    /// Creates a router with the given options.
    pub fn with_options(options: RouterOptions) -> Router<T> {
        Router {
            options,
            destinations: Vec::new(),
        }
    }

    /// Registers a destination reachable through a single pattern and
    /// returns its stable index.
    ///
    /// On a parse failure nothing is registered.
    pub fn add(&mut self, pattern: &str, payload: T) -> Result<u32, ParseError> {
        self.add_all(&[pattern], payload)
    }

    /// Registers a destination reachable through several patterns and
    /// returns its stable index.
    ///
    /// Every pattern parses before anything registers, so a failure in any
    /// of them leaves the registry untouched.
    pub fn add_all(&mut self, patterns: &[&str], payload: T) -> Result<u32, ParseError> {
        let mut routes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            routes.push(pattern::parse(pattern, self.options.default_until)?);
        }

        let mut destination = Destination::new(payload);
        for route in routes {
            destination.add_route(route);
        }
        Ok(self.register(destination))
    }

    /// Registers a pre-built destination, skipping the parser, and returns
    /// its stable index (any index the destination carried is replaced).
    pub fn add_destination(&mut self, destination: Destination<T>) -> u32 {
        self.register(destination)
    }

    fn register(&mut self, mut destination: Destination<T>) -> u32 {
        let index = self.destinations.len() as u32;
        destination.assign_index(index);
        trace!(
            " registered destination {} with {} route(s)",
            index,
            destination.routes().len()
        );
        self.destinations.push(destination);
        index
    }

    /// The registered destinations, in insertion order.
    pub fn destinations(&self) -> &[Destination<T>] {
        &self.destinations
    }

    /// Materializes the decision tree for the current route set.
    ///
    /// Intended for introspection; `compile` materializes its own copy.
    pub fn tree(&self) -> Tree {
        let mut builder = TreeBuilder::new();
        for destination in &self.destinations {
            for route in destination.routes() {
                builder.add_route(route, destination.index());
            }
        }
        builder.finalize()
    }

    /// Compiles the registered routes into an immutable `Matcher`, consuming
    /// the router. The matcher owns the tree, the destinations and their
    /// payloads.
    pub fn compile(self) -> Matcher<T> {
        let tree = self.tree();
        trace!(
            " compiled matcher over {} destination(s)",
            self.destinations.len()
        );
        Matcher::new(tree, self.destinations)
    }
}
