//! Recursive-descent parser for Wisp.
//!
//! Unlike a CST-based parser, this one builds the surface AST directly:
//! each parse function returns the [`crate::ast`] node it recognized (or a
//! [`ParseError`]) rather than emitting events for a later tree-building
//! pass. There is no lossless concrete syntax tree; whitespace and comments
//! never reach the parser at all, since the lexer consumes them as trivia.
//!
//! # Lookahead
//!
//! [`Parser`] owns a [`wisp_lexer::Lexer`] and a small [`VecDeque`] of
//! tokens pulled ahead of the current position. Sub-parsers use `peek`/`at`
//! to look past the current token without consuming it; `bump`/`expect`
//! consume it. Automatic semicolon insertion is resolved entirely inside
//! the lexer -- by the time a token reaches this buffer, any newline has
//! already become a `Semicolon` or vanished.
//!
//! # Record vs. block disambiguation
//!
//! `{` starts out lexed as a block. [`Parser::switch_to_record_context`]
//! forwards to the lexer to reclassify it as a record once a sub-parser has
//! peeked far enough ahead (at most two tokens past the `{`) to know which
//! one it is. See [`primary`] for where that decision is made.

pub(crate) mod declarations;
pub(crate) mod expressions;
pub(crate) mod patterns;
pub(crate) mod primary;
pub(crate) mod types;

use std::collections::VecDeque;
use std::rc::Rc;

use wisp_common::span::Location;
use wisp_common::token::{keyword_to_str, Token, TokenKind, TokenValue};
use wisp_lexer::Lexer;

use crate::error::{ErrorKind, ParseError};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Token kinds that can legally follow a statement with no explicit or
/// ASI-synthesized terminator: the end of the enclosing construct.
const IMPLICIT_TERMINATORS: &[TokenKind] = &[TokenKind::RBrace, TokenKind::Eof];

pub(crate) struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Token>,
    /// The `Eof` token, once seen, is cached and replayed forever: the
    /// lexer's own iterator yields `None` after it, but callers here always
    /// want `current()` to keep returning something.
    eof: Option<Token>,
    /// Mirrors rustc's `NO_STRUCT_LITERAL` restriction: while parsing a
    /// `match` scrutinee, a bare `{` ends the scrutinee instead of starting
    /// an application argument, so `match x { ... }` doesn't swallow its
    /// own arm list as a trailing record/block argument to `x`. `if` needs
    /// no such guard, since its branch is introduced by `then`, not `{`.
    /// Parenthesizing escapes it, same as in Rust.
    no_struct_lit: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(file: impl Into<Rc<str>>, source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(file, source),
            lookahead: VecDeque::new(),
            eof: None,
            no_struct_lit: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() <= n {
            let tok = match self.lexer.next() {
                Some(tok) => tok,
                None => self.eof.clone().expect("lexer must yield Eof before exhausting"),
            };
            if tok.kind == TokenKind::Eof {
                self.eof = Some(tok.clone());
            }
            self.lookahead.push_back(tok);
        }
    }

    pub(crate) fn peek(&mut self, n: usize) -> &Token {
        self.fill(n);
        &self.lookahead[n]
    }

    pub(crate) fn current(&mut self) -> &Token {
        self.peek(0)
    }

    pub(crate) fn current_kind(&mut self) -> TokenKind {
        self.peek(0).kind
    }

    pub(crate) fn current_location(&mut self) -> Location {
        self.peek(0).location.clone()
    }

    pub(crate) fn at(&mut self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub(crate) fn at_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    // ── Consumption ────────────────────────────────────────────────────

    pub(crate) fn bump(&mut self) -> Token {
        self.fill(0);
        self.lookahead.pop_front().expect("just filled")
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consume a token of `kind`, or fail with an `UnexpectedToken` error
    /// describing what was expected in its place.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(expected))
        }
    }

    /// Like [`Self::expect`], but for a closing `)`/`]`/`}`: if EOF is
    /// reached before `kind`, reports `UnclosedDelimiter` pointing back at
    /// `opener` instead of a generic `UnexpectedToken { found: Eof }`.
    pub(crate) fn expect_closing(&mut self, kind: TokenKind, expected: &str, opener: Location) -> PResult<Token> {
        if self.at(TokenKind::Eof) {
            let location = self.current_location();
            return Err(ParseError::new(ErrorKind::UnclosedDelimiter { opener_location: opener }, location));
        }
        self.expect(kind, expected)
    }

    /// Consume the `>` closing a generic argument list. A composite token
    /// beginning with `>` (`>>` from nested generics, `>=` immediately
    /// followed by `=`) is split: the leading `>` is consumed here and the
    /// remainder is pushed back as its own token, the same fix rustc uses
    /// for `Option<List<T>>`-style nesting.
    pub(crate) fn expect_close_angle(&mut self) -> PResult<Token> {
        self.fill(0);
        let rest_kind = match self.lookahead[0].kind {
            TokenKind::OpGt => return Ok(self.bump()),
            TokenKind::OpGtGt => TokenKind::OpGt,
            TokenKind::OpGte => TokenKind::OpAssign,
            _ => return Err(self.error_here("`>`")),
        };
        let tok = self.lookahead.pop_front().expect("just filled");
        let loc = &tok.location;
        let first = Token::new(
            TokenKind::OpGt,
            None,
            Location {
                file: loc.file.clone(),
                start_offset: loc.start_offset,
                end_offset: loc.start_offset + 1,
                start_line: loc.start_line,
                start_col: loc.start_col,
            },
        );
        let rest = Token::new(
            rest_kind,
            None,
            Location {
                file: loc.file.clone(),
                start_offset: loc.start_offset + 1,
                end_offset: loc.end_offset,
                start_line: loc.start_line,
                start_col: loc.start_col + 1,
            },
        );
        self.lookahead.push_front(rest);
        Ok(first)
    }

    pub(crate) fn error_here(&mut self, expected: &str) -> ParseError {
        let found = self.current_kind();
        let location = self.current_location();
        ParseError::new(ErrorKind::UnexpectedToken { expected: expected.into(), found }, location)
    }

    /// Consume a statement terminator: either an explicit `;` or a
    /// `Semicolon` the lexer synthesized from a newline. The last statement
    /// before a closing `}` (or end of file) needs no terminator at all.
    pub(crate) fn expect_terminator(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon).is_some() {
            Ok(())
        } else if self.at_any(IMPLICIT_TERMINATORS) {
            Ok(())
        } else {
            let location = self.current_location();
            Err(ParseError::new(ErrorKind::MissingSemicolon, location))
        }
    }

    /// Swallow any number of redundant terminators (stray `;` or blank
    /// lines collapsed to `Semicolon` tokens) between declarations.
    pub(crate) fn skip_extra_terminators(&mut self) {
        while self.eat(TokenKind::Semicolon).is_some() {}
    }

    pub(crate) fn switch_to_record_context(&mut self) {
        self.lexer.switch_to_record_context();
    }

    pub(crate) fn no_struct_lit(&self) -> bool {
        self.no_struct_lit
    }

    /// Run `f` with a bare `{` forbidden from starting an application
    /// argument, restoring the previous restriction afterward regardless of
    /// whether `f` succeeds.
    pub(crate) fn forbid_struct_lit<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let prev = std::mem::replace(&mut self.no_struct_lit, true);
        let result = f(self);
        self.no_struct_lit = prev;
        result
    }

    /// The inverse of [`Self::forbid_struct_lit`]: used when entering a
    /// parenthesized subexpression, where the closing `)` removes the
    /// ambiguity a surrounding scrutinee position was guarding against.
    pub(crate) fn allow_struct_lit<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let prev = std::mem::replace(&mut self.no_struct_lit, false);
        let result = f(self);
        self.no_struct_lit = prev;
        result
    }
}

/// Recover the text naming `tok`: the decoded payload for an `Identifier`,
/// or the fixed spelling for a keyword used where a name is expected (a
/// record field name, for instance). `None` for anything else.
pub(crate) fn token_name(tok: &Token) -> Option<String> {
    match &tok.value {
        Some(TokenValue::Ident(s)) => Some(s.clone()),
        _ => keyword_to_str(tok.kind).map(str::to_string),
    }
}
