//! End-to-end matching behavior over the public surface.

extern crate shunt;

use std::sync::Arc;
use std::thread;

use shunt::Router;

fn params(found: &shunt::Match<&'static str>) -> Vec<Vec<u8>> {
    found.params().iter().map(|span| span.to_vec()).collect()
}

#[test]
fn literal_routes_round_trip() {
    let mut router = Router::new();
    router.add("GET /ping", "A").unwrap();
    router.add("GET /pong", "B").unwrap();
    let matcher = router.compile();

    let found = matcher.find(b"GET /ping").unwrap();
    assert_eq!(*found.payload(), "A");
    assert!(found.params().is_empty());

    let found = matcher.find(b"GET /pong").unwrap();
    assert_eq!(*found.payload(), "B");
    assert!(found.params().is_empty());

    assert!(matcher.find(b"GET /pin").is_none());
}

#[test]
fn single_parameter_capture() {
    let mut router = Router::new();
    router.add("GET /users/{id}", "U").unwrap();
    let matcher = router.compile();

    let found = matcher.find(b"GET /users/123").unwrap();
    assert_eq!(*found.payload(), "U");
    assert_eq!(params(&found), vec![b"123".to_vec()]);

    // The delimiter is found, and nothing can consume it.
    assert!(matcher.find(b"GET /users/123/").is_none());

    // An empty capture is a capture.
    let found = matcher.find(b"GET /users/").unwrap();
    assert_eq!(*found.payload(), "U");
    assert_eq!(params(&found), vec![b"".to_vec()]);
}

#[test]
fn adjacent_parameters_split_on_the_following_literal() {
    let mut router = Router::new();
    router.add("GET /files/{name}.{ext}", "F").unwrap();
    let matcher = router.compile();

    let found = matcher.find(b"GET /files/report.pdf").unwrap();
    assert_eq!(*found.payload(), "F");
    assert_eq!(params(&found), vec![b"report".to_vec(), b"pdf".to_vec()]);
}

#[test]
fn rest_parameters_capture_the_remainder() {
    let mut router = Router::new();
    router.add("GET /static/{path::\\n}", "S").unwrap();
    let matcher = router.compile();

    let found = matcher.find(b"GET /static/a/b/c.txt").unwrap();
    assert_eq!(*found.payload(), "S");
    assert_eq!(params(&found), vec![b"a/b/c.txt".to_vec()]);
}

#[test]
fn constrained_and_unconstrained_parameters_coexist() {
    let mut router = Router::new();
    router.add("GET /users/{id:[0-9]+}", "N").unwrap();
    router.add("GET /users/{id}", "G").unwrap();
    let matcher = router.compile();

    let found = matcher.find(b"GET /users/42").unwrap();
    assert_eq!(*found.payload(), "N");
    assert_eq!(params(&found), vec![b"42".to_vec()]);

    let found = matcher.find(b"GET /users/alice").unwrap();
    assert_eq!(*found.payload(), "G");
    assert_eq!(params(&found), vec![b"alice".to_vec()]);
}

#[test]
fn leading_constrained_parameter() {
    let mut router = Router::new();
    router.add("{m:(GET|POST)} /api/{ep}", "R").unwrap();
    let matcher = router.compile();

    assert!(matcher.find(b"DELETE /api/x").is_none());

    let found = matcher.find(b"POST /api/x").unwrap();
    assert_eq!(*found.payload(), "R");
    assert_eq!(params(&found), vec![b"POST".to_vec(), b"x".to_vec()]);
}

#[test]
fn insertion_order_breaks_ties() {
    let mut router = Router::new();
    router.add("GET /dup", "first").unwrap();
    router.add("GET /dup", "second").unwrap();
    let matcher = router.compile();

    assert_eq!(matcher.find(b"GET /dup").map(|m| *m.payload()), Some("first"));
}

#[test]
fn exact_children_win_and_fall_back() {
    let mut router = Router::new();
    router.add("GET /users/{id}/posts", "param").unwrap();
    router.add("GET /users/me/inbox", "exact").unwrap();
    let matcher = router.compile();

    assert_eq!(
        matcher.find(b"GET /users/me/inbox").map(|m| *m.payload()),
        Some("exact")
    );
    // The static subtree for "me/..." dies at "posts", and traversal must
    // fall back to the parametric alternative of the shared node.
    let found = matcher.find(b"GET /users/me/posts").unwrap();
    assert_eq!(*found.payload(), "param");
    assert_eq!(params(&found), vec![b"me".to_vec()]);
}

#[test]
fn terminals_demand_exhausted_input() {
    let mut router = Router::new();
    router.add("GET /a", "a").unwrap();
    let matcher = router.compile();

    assert!(matcher.find(b"GET /a").is_some());
    assert!(matcher.find(b"GET /ab").is_none());
    assert!(matcher.find(b"GET /").is_none());
    assert!(matcher.find(b"GET /a ").is_none());
}

#[test]
fn concurrent_matching_agrees_with_sequential() {
    let mut router = Router::new();
    router.add("GET /ping", "ping").unwrap();
    router.add("GET /users/{id:[0-9]+}", "user-n").unwrap();
    router.add("GET /users/{id}", "user").unwrap();
    router.add("GET /static/{path::\\n}", "static").unwrap();
    let matcher = Arc::new(router.compile());

    let inputs: Vec<&'static [u8]> = vec![
        b"GET /ping",
        b"GET /users/42",
        b"GET /users/alice",
        b"GET /static/a/b.css",
        b"GET /users/42/",
        b"POST /ping",
        b"",
    ];

    let expected: Vec<Option<(&'static str, Vec<Vec<u8>>)>> = inputs
        .iter()
        .map(|input| {
            matcher
                .find(input)
                .map(|found| (*found.payload(), params(&found)))
        })
        .collect();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let matcher = Arc::clone(&matcher);
        let inputs = inputs.clone();
        handles.push(thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..500 {
                seen.clear();
                for input in &inputs {
                    seen.push(
                        matcher
                            .find(input)
                            .map(|found| (*found.payload(), params(&found))),
                    );
                }
            }
            seen
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
