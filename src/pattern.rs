//! Parses route patterns into `Route` values.
//!
//! The grammar:
//!
//! ```text
//! pattern := step+
//! step    := exact | param
//! exact   := <any byte except '{' or '}'>+
//! param   := '{' name [ ':' regex ] [ ':' delim ] '}'
//!          | '{' name '::' delim '}'
//! name    := [A-Za-z_][A-Za-z0-9_]*
//! regex   := <any characters, brace-balanced>
//! delim   := a single byte, or the escape '\n' denoting the end-of-input
//!            sentinel (not the newline byte)
//! ```
//!
//! There is no escape for a literal `{`: every opening brace must introduce a
//! well-formed parameter, and a stray `}` in literal text is rejected.
//!
//! A parameter that does not name its delimiter explicitly takes the first
//! byte of the literal step that follows it, so `/files/{name}.{ext}` stops
//! `name` at the dot. A trailing parameter falls back to the configured
//! `default_until` byte (`'/'` unless overridden). An explicit delimiter
//! always wins. The `\n` sentinel makes the parameter capture all remaining
//! input; nothing may follow it in the same route.

use std::error::Error;
use std::fmt;
use std::mem;

use route::Route;
use tree::regex::ConstrainedCaptureRegex;
use tree::step::{Delimiter, Step};

/// A structured failure raised while parsing a route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The pattern contains no steps at all.
    EmptyPattern,

    /// A parameter was opened but the pattern ended before its closing brace.
    UnexpectedEndOfInput {
        /// Byte offset of the opening brace.
        at: usize,
    },

    /// A `}` appeared in literal text. Braces delimit parameters and have no
    /// literal escape.
    UnbalancedBrace {
        /// Byte offset of the offending brace.
        at: usize,
    },

    /// A parameter has no name, as in `{}` or `{:regex}`.
    EmptyParameterName {
        /// Byte offset of the opening brace.
        at: usize,
    },

    /// A parameter name strays from `[A-Za-z_][A-Za-z0-9_]*`.
    InvalidParameterName {
        /// The offending name.
        name: String,
    },

    /// Two parameters within one route share a name.
    DuplicateParameterName {
        /// The repeated name.
        name: String,
    },

    /// An explicit delimiter is neither a single byte nor the `\n` escape.
    InvalidDelimiter {
        /// The offending delimiter text.
        delimiter: String,
    },

    /// A step follows a parameter that captures to the end of the input.
    TrailingAfterRestParameter {
        /// Name of the rest parameter.
        name: String,
    },

    /// A parameter constraint failed to compile as a regular expression.
    InvalidRegex {
        /// Name of the parameter carrying the constraint.
        name: String,
        /// The error reported by the regex engine.
        error: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::EmptyPattern => write!(f, "pattern is empty"),
            ParseError::UnexpectedEndOfInput { at } => {
                write!(f, "parameter opened at offset {} is never closed", at)
            }
            ParseError::UnbalancedBrace { at } => {
                write!(f, "unbalanced brace at offset {}", at)
            }
            ParseError::EmptyParameterName { at } => {
                write!(f, "parameter at offset {} has no name", at)
            }
            ParseError::InvalidParameterName { ref name } => {
                write!(f, "invalid parameter name `{}`", name)
            }
            ParseError::DuplicateParameterName { ref name } => {
                write!(f, "parameter name `{}` is used more than once", name)
            }
            ParseError::InvalidDelimiter { ref delimiter } => write!(
                f,
                "delimiter `{}` is neither a single byte nor the `\\n` escape",
                delimiter
            ),
            ParseError::TrailingAfterRestParameter { ref name } => write!(
                f,
                "rest parameter `{}` must be the last step of its route",
                name
            ),
            ParseError::InvalidRegex {
                ref name,
                ref error,
            } => write!(f, "constraint for parameter `{}` is invalid: {}", name, error),
        }
    }
}

impl Error for ParseError {}

// Steps as scanned, before delimiter resolution.
enum RawStep {
    Literal(Vec<u8>),
    Param {
        name: String,
        regex: Option<String>,
        delimiter: Option<Delimiter>,
    },
}

/// Parses `pattern` into a `Route`.
///
/// `default_until` supplies the delimiter for parameters that neither name
/// one explicitly nor are followed by a literal step. Callers normally reach
/// this through `Router::add`, which passes the configured option along.
pub fn parse(pattern: &str, default_until: u8) -> Result<Route, ParseError> {
    if pattern.is_empty() {
        return Err(ParseError::EmptyPattern);
    }

    let bytes = pattern.as_bytes();
    let mut raw = Vec::new();
    let mut literal = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut at = 0;

    while at < bytes.len() {
        match bytes[at] {
            b'{' => {
                if !literal.is_empty() {
                    raw.push(RawStep::Literal(mem::replace(&mut literal, Vec::new())));
                }
                at = parse_param(pattern, at, &mut raw, &mut names)?;
            }
            b'}' => return Err(ParseError::UnbalancedBrace { at }),
            byte => {
                literal.push(byte);
                at += 1;
            }
        }
    }
    if !literal.is_empty() {
        raw.push(RawStep::Literal(literal));
    }

    resolve(pattern, raw, default_until)
}

// Scans one parameter starting at the opening brace, returning the offset
// just past its closing brace. Brace depth is tracked so constraints such as
// `[0-9]{3}` survive intact.
fn parse_param(
    pattern: &str,
    open: usize,
    raw: &mut Vec<RawStep>,
    names: &mut Vec<String>,
) -> Result<usize, ParseError> {
    let bytes = pattern.as_bytes();
    let mut depth = 0;
    let mut close = None;
    let mut at = open + 1;

    while at < bytes.len() {
        match bytes[at] {
            b'{' => depth += 1,
            b'}' if depth == 0 => {
                close = Some(at);
                break;
            }
            b'}' => depth -= 1,
            _ => {}
        }
        at += 1;
    }

    let close = match close {
        Some(close) => close,
        None => return Err(ParseError::UnexpectedEndOfInput { at: open }),
    };

    let body = &pattern[open + 1..close];
    let (name, rest) = match body.find(':') {
        Some(colon) => (&body[..colon], Some(&body[colon + 1..])),
        None => (body, None),
    };

    if name.is_empty() {
        return Err(ParseError::EmptyParameterName { at: open });
    }
    if !valid_name(name) {
        return Err(ParseError::InvalidParameterName {
            name: name.to_string(),
        });
    }
    if names.iter().any(|seen| seen == name) {
        return Err(ParseError::DuplicateParameterName {
            name: name.to_string(),
        });
    }
    names.push(name.to_string());

    let (regex, delimiter) = match rest {
        Some(rest) => split_constraint(rest)?,
        None => (None, None),
    };

    raw.push(RawStep::Param {
        name: name.to_string(),
        regex: regex.map(|regex| regex.to_string()),
        delimiter,
    });

    Ok(close + 1)
}

// Splits the text after the first colon into constraint and delimiter.
// The recognized shapes are `:d` (delimiter only), `regex`, `regex:d` and
// `regex:\n`. A regex that itself ends in `:x` loses the suffix to the
// delimiter; such a constraint needs its delimiter written explicitly.
fn split_constraint(rest: &str) -> Result<(Option<&str>, Option<Delimiter>), ParseError> {
    if rest.starts_with(':') {
        return Ok((None, Some(parse_delimiter(&rest[1..])?)));
    }

    let bytes = rest.as_bytes();
    if bytes.len() >= 3 && &bytes[bytes.len() - 3..] == b":\\n" {
        return Ok((Some(&rest[..rest.len() - 3]), Some(Delimiter::EndOfInput)));
    }
    if bytes.len() >= 2 && bytes[bytes.len() - 2] == b':' {
        return Ok((
            Some(&rest[..rest.len() - 2]),
            Some(Delimiter::Byte(bytes[bytes.len() - 1])),
        ));
    }

    Ok((Some(rest), None))
}

fn parse_delimiter(text: &str) -> Result<Delimiter, ParseError> {
    if text == "\\n" {
        return Ok(Delimiter::EndOfInput);
    }
    if text.as_bytes().len() == 1 {
        return Ok(Delimiter::Byte(text.as_bytes()[0]));
    }
    Err(ParseError::InvalidDelimiter {
        delimiter: text.to_string(),
    })
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Turns raw steps into final ones: resolves implicit delimiters, compiles
// constraints, and enforces that a rest parameter ends its route.
fn resolve(pattern: &str, raw: Vec<RawStep>, default_until: u8) -> Result<Route, ParseError> {
    let mut steps = Vec::with_capacity(raw.len());

    for at in 0..raw.len() {
        let step = match raw[at] {
            RawStep::Literal(ref literal) => Step::Static {
                literal: literal.clone(),
            },
            RawStep::Param {
                ref name,
                ref regex,
                ref delimiter,
            } => {
                let until = match *delimiter {
                    Some(delimiter) => delimiter,
                    None => match raw.get(at + 1) {
                        Some(&RawStep::Literal(ref literal)) => Delimiter::Byte(literal[0]),
                        _ => Delimiter::Byte(default_until),
                    },
                };
                match *regex {
                    Some(ref source) => {
                        let regex = ConstrainedCaptureRegex::new(source).map_err(|error| {
                            ParseError::InvalidRegex {
                                name: name.clone(),
                                error: error.to_string(),
                            }
                        })?;
                        Step::Constrained {
                            name: name.clone(),
                            regex,
                            until,
                        }
                    }
                    None => Step::Dynamic {
                        name: name.clone(),
                        until,
                    },
                }
            }
        };
        steps.push(step);
    }

    for (at, step) in steps.iter().enumerate() {
        let rest_name = match *step {
            Step::Dynamic {
                ref name,
                until: Delimiter::EndOfInput,
            }
            | Step::Constrained {
                ref name,
                until: Delimiter::EndOfInput,
                ..
            } => Some(name),
            _ => None,
        };
        if let Some(name) = rest_name {
            if at + 1 != steps.len() {
                return Err(ParseError::TrailingAfterRestParameter { name: name.clone() });
            }
        }
    }

    Ok(Route::from_parts(steps, pattern.to_string()))
}
