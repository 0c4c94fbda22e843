//! Parse error types for the Wisp parser.

use std::fmt;

use serde::Serialize;
use wisp_common::span::Location;
use wisp_common::token::TokenKind;

/// A parse error with location information and optional related location.
///
/// Parse errors carry the primary location where the problem was detected,
/// a structured [`ErrorKind`], and an optional related location for context
/// (e.g. "opened here" for an unclosed delimiter).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub location: Location,
    pub related: Option<(String, Location)>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, location: Location) -> Self {
        Self {
            kind,
            location,
            related: None,
        }
    }

    pub fn with_related(kind: ErrorKind, location: Location, related_message: impl Into<String>, related_location: Location) -> Self {
        Self {
            kind,
            location,
            related: Some((related_message.into(), related_location)),
        }
    }
}

/// The taxonomy of errors the parser (and the lexer/desugarer stages it
/// drives) can report. Only one is ever surfaced per parse: the parser
/// stops at the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ErrorKind {
    /// A lexical error was encountered while pulling the next token.
    LexError(String),
    /// A token of one kind was expected but another was found.
    UnexpectedToken { expected: String, found: TokenKind },
    /// A reserved keyword was used where record shorthand requires a plain
    /// field name (`{ match }` is not the shorthand for `{ match = match }`).
    ReservedKeywordInShorthand { keyword: String },
    /// Automatic semicolon insertion could not produce a valid statement
    /// boundary and an explicit `;` was required but missing.
    MissingSemicolon,
    /// A `(`, `[`, or `{` was never closed.
    UnclosedDelimiter { opener_location: Location },
    /// A pattern was used in a position where the surrounding construct
    /// makes it invalid (e.g. a non-irrefutable pattern in a `let` binding).
    InvalidPatternInContext,
    /// Lowering the surface AST to the core AST failed.
    DesugarError(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexError(msg) => write!(f, "{msg}"),
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found:?}")
            }
            Self::ReservedKeywordInShorthand { keyword } => {
                write!(f, "`{keyword}` is a reserved keyword and cannot be used as record shorthand")
            }
            Self::MissingSemicolon => write!(f, "expected `;` or a newline to end the statement"),
            Self::UnclosedDelimiter { .. } => write!(f, "unclosed delimiter"),
            Self::InvalidPatternInContext => write!(f, "this pattern is not valid here"),
            Self::DesugarError(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_common::span::{LineIndex, Span};
    use std::rc::Rc;

    fn loc(start: u32, end: u32) -> Location {
        let idx = LineIndex::new("0123456789");
        Location::new(Rc::from("t.wisp"), Span::new(start, end), &idx)
    }

    #[test]
    fn unexpected_token_display() {
        let err = ParseError::new(
            ErrorKind::UnexpectedToken { expected: "`)`".into(), found: TokenKind::Comma },
            loc(0, 1),
        );
        assert_eq!(err.to_string(), "expected `)`, found Comma");
    }

    #[test]
    fn with_related_carries_both_locations() {
        let err = ParseError::with_related(
            ErrorKind::UnclosedDelimiter { opener_location: loc(0, 1) },
            loc(9, 10),
            "opened here",
            loc(0, 1),
        );
        assert!(err.related.is_some());
    }

    #[test]
    fn reserved_keyword_in_shorthand_display() {
        let err = ParseError::new(ErrorKind::ReservedKeywordInShorthand { keyword: "match".into() }, loc(0, 5));
        assert!(err.to_string().contains("reserved keyword"));
    }
}
