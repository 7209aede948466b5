//! Defines the wrapping type for a capture-constraining regex.

use regex::bytes::Regex;
use regex::Error;

use std::cmp::Ordering;
use std::fmt;

/// A wrapper for `regex::bytes::Regex` that implements `PartialEq`, `Eq`,
/// `PartialOrd` and `Ord` by comparing the underlying source text of the
/// regular expression, so steps and tree nodes holding one can themselves be
/// compared and merged.
///
/// The match target is a raw byte span, which is why the `bytes` engine is
/// used rather than the `str` one.
pub struct ConstrainedCaptureRegex {
    source: String,
    regex: Regex,
}

impl ConstrainedCaptureRegex {
    /// Compiles a new `ConstrainedCaptureRegex` from the provided pattern.
    ///
    /// The pattern is wrapped in begin and end of input anchors (as
    /// `^(?:pattern)$`) to prevent it from matching less than the whole
    /// captured span.
    pub fn new(pattern: &str) -> Result<ConstrainedCaptureRegex, Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(ConstrainedCaptureRegex {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The source text of the regular expression, without the anchors added
    /// at construction.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if and only if the whole of `span` matches the regex.
    pub fn is_match(&self, span: &[u8]) -> bool {
        self.regex.is_match(span)
    }
}

impl PartialEq for ConstrainedCaptureRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ConstrainedCaptureRegex {}

impl PartialOrd for ConstrainedCaptureRegex {
    fn partial_cmp(&self, other: &ConstrainedCaptureRegex) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConstrainedCaptureRegex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source.cmp(&other.source)
    }
}

impl Clone for ConstrainedCaptureRegex {
    fn clone(&self) -> ConstrainedCaptureRegex {
        ConstrainedCaptureRegex {
            source: self.source.clone(),
            regex: self.regex.clone(),
        }
    }
}

impl fmt::Debug for ConstrainedCaptureRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConstrainedCaptureRegex({})", self.source)
    }
}
