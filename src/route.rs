//! Defines `Route` and `Destination`.
//!
//! A route is the parsed form of one pattern; a destination is a payload
//! together with every route that resolves to it. Destinations receive a
//! dense, zero-based index in registration order, which is the index the
//! matcher reports back and the final tiebreaker when routes overlap.

use std::fmt;

use tree::step::Step;

/// An ordered sequence of steps describing one matchable input shape.
///
/// Routes are normally produced by the pattern parser, which records the
/// original pattern text. Routes built programmatically from steps carry the
/// canonical rendering of those steps instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    steps: Vec<Step>,
    text: String,
}

impl Route {
    /// Builds a route from pre-constructed steps.
    ///
    /// Adjacent `Static` steps are merged, preserving the invariant the
    /// parser maintains for its own output.
    pub fn from_steps(steps: Vec<Step>) -> Route {
        let mut merged: Vec<Step> = Vec::with_capacity(steps.len());
        for step in steps {
            let step = match step {
                Step::Static { literal } => {
                    let mut absorbed = false;
                    if let Some(&mut Step::Static {
                        literal: ref mut previous,
                    }) = merged.last_mut()
                    {
                        previous.extend_from_slice(&literal);
                        absorbed = true;
                    }
                    if absorbed {
                        continue;
                    }
                    Step::Static { literal }
                }
                other => other,
            };
            merged.push(step);
        }

        let text = merged
            .iter()
            .map(|step| step.to_string())
            .collect::<Vec<String>>()
            .concat();

        Route {
            steps: merged,
            text,
        }
    }

    pub(crate) fn from_parts(steps: Vec<Step>, text: String) -> Route {
        Route { steps, text }
    }

    /// The steps of this route, in match order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The pattern text this route was parsed from, or the canonical
    /// rendering of its steps when it was built programmatically.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of parameters this route captures.
    pub fn captures(&self) -> usize {
        self.steps.iter().filter(|step| step.is_capture()).count()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A payload plus the set of routes that resolve to it.
///
/// The payload type is opaque to the core; it is stored untouched and handed
/// back by reference on a successful match.
pub struct Destination<T> {
    index: u32,
    routes: Vec<Route>,
    payload: T,
}

impl<T> Destination<T> {
    /// Creates a destination with no routes yet. The registry assigns the
    /// stable index at registration time.
    pub fn new(payload: T) -> Destination<T> {
        Destination {
            index: 0,
            routes: Vec::new(),
            payload,
        }
    }

    /// Adds a route, builder style.
    pub fn with_route(mut self, route: Route) -> Destination<T> {
        self.routes.push(route);
        self
    }

    /// Adds a route.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// The stable, zero-based index assigned at registration.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The routes resolving to this destination, in the order added.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Borrows the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub(crate) fn assign_index(&mut self, index: u32) {
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tree::step::Delimiter;

    #[test]
    fn merges_adjacent_literals() {
        let route = Route::from_steps(vec![
            Step::Static {
                literal: b"GET ".to_vec(),
            },
            Step::Static {
                literal: b"/ping".to_vec(),
            },
        ]);
        assert_eq!(route.steps().len(), 1);
        assert_eq!(route.text(), "GET /ping");
    }

    #[test]
    fn renders_canonical_text() {
        let route = Route::from_steps(vec![
            Step::Static {
                literal: b"GET /users/".to_vec(),
            },
            Step::Dynamic {
                name: "id".to_string(),
                until: Delimiter::Byte(b'/'),
            },
        ]);
        assert_eq!(route.text(), "GET /users/{id::/}");
        assert_eq!(route.captures(), 1);
    }

    #[test]
    fn destinations_hold_routes_in_order() {
        let destination = Destination::new("payload")
            .with_route(Route::from_steps(vec![Step::Static {
                literal: b"GET /a".to_vec(),
            }]))
            .with_route(Route::from_steps(vec![Step::Static {
                literal: b"GET /b".to_vec(),
            }]));

        assert_eq!(destination.routes().len(), 2);
        assert_eq!(destination.routes()[0].text(), "GET /a");
        assert_eq!(destination.routes()[1].text(), "GET /b");
        assert_eq!(*destination.payload(), "payload");
    }
}
