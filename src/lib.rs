//! Shunt &ndash; a compiled route-dispatch core.
//!
//! Routes are registered as patterns bound to opaque payloads, merged into a
//! hybrid trie/radix decision tree, and compiled into an immutable `Matcher`
//! built to answer millions of match queries per second.
//!
//! The crate deliberately stops at dispatch: it does not parse requests,
//! decode percent-escapes, normalize slashes or understand query strings.
//! Input is a raw byte string (typically `METHOD PATH`) and the result is the
//! payload of the winning route plus the captured parameter spans.
//!
//! ```rust
//! extern crate shunt;
//!
//! use shunt::Router;
//!
//! # fn main() {
//! let mut router = Router::new();
//! router.add("GET /ping", "pong").unwrap();
//! router.add("GET /users/{id}", "user").unwrap();
//!
//! let matcher = router.compile();
//!
//! let found = matcher.find(b"GET /users/42").unwrap();
//! assert_eq!(*found.payload(), "user");
//! assert_eq!(found.params(), &[&b"42"[..]][..]);
//!
//! assert!(matcher.find(b"GET /pong").is_none());
//! # }
//! ```
#![warn(missing_docs, deprecated)]
#![doc(test(no_crate_inject, attr(deny(warnings))))]

#[macro_use]
extern crate log;
extern crate regex;

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod router;
pub mod tree;

pub use matcher::{Match, Matcher};
pub use pattern::ParseError;
pub use route::{Destination, Route};
pub use router::{Router, RouterOptions};
pub use tree::step::{Delimiter, Step};
pub use tree::Tree;
