//! Defines `Step` and `Delimiter`, the atomic matching units of a `Route`.

use std::fmt;

use tree::regex::ConstrainedCaptureRegex;

/// Marks where a captured span ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Delimiter {
    /// The span ends at the first occurrence of this byte, or at the end of
    /// the input when the byte does not occur. The byte itself is not
    /// consumed; it remains the next byte to be matched.
    Byte(u8),

    /// The span extends to the end of the input, making the parameter a rest
    /// parameter. Written as the escape `\n` in pattern text.
    EndOfInput,
}

/// An atomic matching unit within a `Route`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Is matched exactly (byte equality) against the input at the current
    /// cursor. Unlike the other variants, `Static` steps capture nothing.
    Static {
        /// The literal bytes the input must contain.
        literal: Vec<u8>,
    },

    /// Captures a span of input ending at the delimiter.
    Dynamic {
        /// The parameter name, unique within its route.
        name: String,
        /// Where the captured span ends.
        until: Delimiter,
    },

    /// Captures a span of input ending at the delimiter and requires the
    /// whole span to match the supplied regex.
    Constrained {
        /// The parameter name, unique within its route.
        name: String,
        /// Regex the captured span must match, anchored at both ends.
        regex: ConstrainedCaptureRegex,
        /// Where the captured span ends.
        until: Delimiter,
    },
}

impl Step {
    /// True when this step captures a parameter.
    pub fn is_capture(&self) -> bool {
        match *self {
            Step::Static { .. } => false,
            Step::Dynamic { .. } | Step::Constrained { .. } => true,
        }
    }

    /// The name of the parameter this step captures, if any.
    pub fn name(&self) -> Option<&str> {
        match *self {
            Step::Static { .. } => None,
            Step::Dynamic { ref name, .. } | Step::Constrained { ref name, .. } => Some(name),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Delimiter::Byte(b) => write!(f, "{}", b as char),
            Delimiter::EndOfInput => write!(f, "\\n"),
        }
    }
}

impl fmt::Display for Step {
    /// Renders the step in pattern syntax, with the delimiter always explicit.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Step::Static { ref literal } => write!(f, "{}", String::from_utf8_lossy(literal)),
            Step::Dynamic { ref name, until } => write!(f, "{{{}::{}}}", name, until),
            Step::Constrained {
                ref name,
                ref regex,
                until,
            } => write!(f, "{{{}:{}:{}}}", name, regex.as_str(), until),
        }
    }
}
