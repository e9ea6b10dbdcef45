//! The runtime value domain (spec §4.1) and its coercion rules.

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use crate::ErrorKind;

/// A single cell's evaluated value, or one slot of an expanded range/array.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
    Error(ErrorKind),
    /// Ordered sequence of values, row-major for a range expansion.
    Array(Vec<Value>),
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => n.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Empty => state.write_u8(0),
            Value::Error(e) => e.hash(state),
            Value::Array(a) => a.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Text(s) => write!(f, "{s}"),
            Value::Empty => write!(f, ""),
            Value::Error(e) => write!(f, "{e}"),
            Value::Array(a) => write!(f, "{a:?}"),
        }
    }
}

impl Value {
    /// Numeric-context coercion (spec §4.1): the first operand to carry an
    /// error short-circuits by returning that error back out as `Err`.
    pub fn to_number(&self) -> Result<f64, ErrorKind> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Empty => Ok(0.0),
            Value::Text(s) => parse_decimal(s).ok_or(ErrorKind::Value),
            Value::Error(e) => Err(*e),
            Value::Array(items) => match items.first() {
                Some(v) => v.to_number(),
                None => Ok(0.0),
            },
        }
    }

    /// Text-context coercion (spec §4.1).
    pub fn to_text(&self) -> Result<String, ErrorKind> {
        match self {
            Value::Number(n) => Ok(format_shortest(*n)),
            Value::Bool(b) => Ok(if *b { "True".to_string() } else { "False".to_string() }),
            Value::Text(s) => Ok(s.clone()),
            Value::Empty => Ok(String::new()),
            Value::Error(e) => Err(*e),
            Value::Array(items) => match items.first() {
                Some(v) => v.to_text(),
                None => Ok(String::new()),
            },
        }
    }

    /// Boolean-context coercion, used by `IF`'s condition (spec §4.1).
    pub fn to_bool(&self) -> Result<bool, ErrorKind> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0.0),
            Value::Empty => Ok(false),
            Value::Text(s) => match s.to_ascii_uppercase().as_str() {
                "TRUE" => Ok(true),
                "FALSE" => Ok(false),
                _ => Err(ErrorKind::Value),
            },
            Value::Error(e) => Err(*e),
            Value::Array(items) => match items.first() {
                Some(v) => v.to_bool(),
                None => Ok(false),
            },
        }
    }

    /// True if this value is an error sentinel.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Flatten arrays into their leaf values, depth-first, row-major.
    /// Scalars yield themselves as a single-element sequence.
    pub fn flatten(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Value>) {
        match self {
            Value::Array(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

/// Parse a decimal number with optional leading sign, decimal point, and
/// exponent (spec §4.1 "Text→parse as decimal").
fn parse_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Classify a cell's raw stored text into a [`Value`] (spec §3: a raw cell
/// holds "an optional raw text value"; spec §4.5's `ValueResolver.read_cell`
/// parses it as a number if possible, otherwise keeps it as text).
pub fn classify_literal(text: &str) -> Value {
    match parse_decimal(text) {
        Some(n) => Value::Number(n),
        None => Value::Text(text.to_string()),
    }
}

/// Shortest round-trippable decimal representation of a number (spec §4.1
/// text-context coercion). Rust's default `f64` `Display` is already
/// shortest-round-trip, so this is a thin, documented wrapper rather than a
/// hand-rolled Grisu/Ryu implementation.
fn format_shortest(n: f64) -> String {
    format!("{n}")
}
