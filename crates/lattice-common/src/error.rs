//! Spreadsheet-level error sentinels.
//!
//! These are the values a formula can evaluate *to* — they are first-class
//! members of [`crate::Value`], never Rust `Result::Err`s. Rust-level
//! failures (a malformed cell id handed to an API from code, say) are a
//! different concern; see `lattice-eval`'s `ProcessError` for those.

use std::fmt;

/// The fixed vocabulary of evaluation-failure sentinels.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Division by zero.
    Div0,
    /// Operand could not be coerced to the type an operator/function needs.
    Value,
    /// Unknown function name.
    Name,
    /// Bad sheet/cell reference, or a range that exceeds the size cap.
    Ref,
    /// Member of, or downstream of, a circular dependency.
    Cycle,
    /// Formula text failed to parse.
    Error,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Div0 => "#DIV/0!",
            Self::Value => "#VALUE!",
            Self::Name => "#NAME?",
            Self::Ref => "#REF!",
            Self::Cycle => "#CYCLE!",
            Self::Error => "#ERROR",
        })
    }
}

impl ErrorKind {
    /// Parse one of the wire-visible sentinel strings back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "#DIV/0!" => Self::Div0,
            "#VALUE!" => Self::Value,
            "#NAME?" => Self::Name,
            "#REF!" => Self::Ref,
            "#CYCLE!" => Self::Cycle,
            "#ERROR" => Self::Error,
            _ => return None,
        })
    }
}

impl std::error::Error for ErrorKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_sentinel_vocabulary() {
        assert_eq!(ErrorKind::Div0.to_string(), "#DIV/0!");
        assert_eq!(ErrorKind::Value.to_string(), "#VALUE!");
        assert_eq!(ErrorKind::Name.to_string(), "#NAME?");
        assert_eq!(ErrorKind::Ref.to_string(), "#REF!");
        assert_eq!(ErrorKind::Cycle.to_string(), "#CYCLE!");
        assert_eq!(ErrorKind::Error.to_string(), "#ERROR");
    }

    #[test]
    fn parse_roundtrips_display() {
        for kind in [
            ErrorKind::Div0,
            ErrorKind::Value,
            ErrorKind::Name,
            ErrorKind::Ref,
            ErrorKind::Cycle,
            ErrorKind::Error,
        ] {
            assert_eq!(ErrorKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(ErrorKind::parse("#NOPE!"), None);
    }
}
