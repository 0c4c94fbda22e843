use std::fmt;

use serde::Serialize;

use crate::span::Location;

/// A lexer error with location information.
///
/// Errors are collected during lexing rather than aborting immediately,
/// enabling `tokenize_with_errors` to report every malformed token in a
/// source file in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
}

impl LexError {
    pub fn new(kind: LexErrorKind, location: Location) -> Self {
        Self { kind, location }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    UnexpectedCharacter(char),
    /// A string literal was not closed before end of input.
    UnterminatedString,
    /// A block comment (`/* ... */`) was not closed before end of input.
    UnterminatedBlockComment,
    /// An invalid escape sequence was encountered in a string.
    InvalidEscapeSequence(char),
    /// A `\u{...}` escape did not name a valid Unicode scalar value.
    InvalidUnicodeEscape(String),
    /// A number literal could not be parsed.
    InvalidNumberLiteral(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            Self::InvalidEscapeSequence(c) => write!(f, "invalid escape sequence: \\{c}"),
            Self::InvalidUnicodeEscape(s) => write!(f, "invalid unicode escape: \\u{{{s}}}"),
            Self::InvalidNumberLiteral(s) => write!(f, "invalid number literal: {s}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{LineIndex, Span};
    use std::rc::Rc;

    fn loc(start: u32, end: u32) -> Location {
        let idx = LineIndex::new("0123456789");
        Location::new(Rc::from("t.wisp"), Span::new(start, end), &idx)
    }

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::UnexpectedCharacter('@'), loc(0, 1));
        assert_eq!(err.to_string(), "unexpected character: '@'");
    }

    #[test]
    fn lex_error_kind_display_all_variants() {
        assert_eq!(
            LexErrorKind::UnterminatedString.to_string(),
            "unterminated string literal"
        );
        assert_eq!(
            LexErrorKind::UnterminatedBlockComment.to_string(),
            "unterminated block comment"
        );
        assert_eq!(
            LexErrorKind::InvalidEscapeSequence('n').to_string(),
            "invalid escape sequence: \\n"
        );
        assert_eq!(
            LexErrorKind::InvalidUnicodeEscape("zzzz".into()).to_string(),
            "invalid unicode escape: \\u{zzzz}"
        );
        assert_eq!(
            LexErrorKind::InvalidNumberLiteral("0x".into()).to_string(),
            "invalid number literal: 0x"
        );
    }
}
