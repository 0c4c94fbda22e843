// Wisp lexer -- tokenizer for the Wisp programming language.
//
// Implements automatic semicolon insertion (ASI) via a context stack: `(`
// and `[` suppress ASI entirely (newlines are insignificant inside them),
// `{` starts out as a block (where ASI applies) and can be reclassified to
// a record (where newlines are insignificant, matching comma-separated
// fields) by the parser once it has looked far enough ahead to tell which
// one it is.

mod cursor;

use std::collections::VecDeque;
use std::rc::Rc;

use cursor::Cursor;
use unicode_xid::UnicodeXID;
use wisp_common::error::{LexError, LexErrorKind};
use wisp_common::span::{LineIndex, Location, Span};
use wisp_common::token::{keyword_from_str, Token, TokenKind, TokenValue};

/// What kind of `(`/`[`/`{` scope the lexer is currently inside, for the
/// purpose of deciding whether a newline is statement-significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexContext {
    /// Module top level. ASI applies.
    Top,
    /// Inside `( ... )`. Newlines are always insignificant.
    Paren,
    /// Inside `[ ... ]`. Newlines are always insignificant.
    Bracket,
    /// Inside `{ ... }` believed to be a block. ASI applies.
    Block,
    /// Inside `{ ... }` confirmed to be a record literal/pattern. Newlines
    /// are always insignificant; fields are comma-separated.
    Record,
}

/// The Wisp lexer. Converts source text into a stream of tokens.
///
/// Wraps a [`Cursor`] for byte-level iteration and implements
/// `Iterator<Item = Token>` so callers can consume tokens lazily or collect
/// them into a `Vec`. Automatic semicolon insertion happens transparently:
/// callers never see raw `NEWLINE` tokens, only the `Semicolon` tokens ASI
/// decided to synthesize (or nothing, when a newline was insignificant).
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    file: Rc<str>,
    line_index: LineIndex,
    emitted_eof: bool,
    /// Tokens already lexed ahead of time (by ASI lookahead) waiting to be
    /// returned before lexing resumes from the cursor.
    pending: VecDeque<Token>,
    context_stack: Vec<LexContext>,
    /// Kind of the most recently *returned* token, used to decide whether
    /// it can terminate a statement.
    prev_kind: Option<TokenKind>,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for `source`, attributing all locations to `file`.
    pub fn new(file: impl Into<Rc<str>>, source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file: file.into(),
            line_index: LineIndex::new(source),
            emitted_eof: false,
            pending: VecDeque::new(),
            context_stack: vec![LexContext::Top],
            prev_kind: None,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`, using a
    /// placeholder file name. The returned vector includes the final `Eof`
    /// token; any lexical errors are reported as `TokenKind::Error` tokens
    /// at their position rather than surfaced separately.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new("<input>", source).collect()
    }

    /// Tokenize the entire source, returning both the token stream and
    /// every lexical error encountered. Unlike `tokenize`, this does not
    /// stop accumulating errors at the first one -- each malformed token is
    /// recorded and lexing continues.
    pub fn tokenize_with_errors(
        file: impl Into<Rc<str>>,
        source: &'src str,
    ) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(file, source);
        let tokens: Vec<Token> = (&mut lexer).collect();
        (tokens, lexer.errors)
    }

    /// Reclassify the innermost `{ ... }` scope as a record rather than a
    /// block. Called by the parser immediately after it has peeked enough
    /// tokens past the opening `{` to determine the brace starts a record
    /// literal or pattern, before any further `{` can have been pushed.
    pub fn switch_to_record_context(&mut self) {
        if let Some(top @ LexContext::Block) = self.context_stack.last_mut() {
            *top = LexContext::Record;
        }
    }

    fn loc(&self, span: Span) -> Location {
        Location::new(self.file.clone(), span, &self.line_index)
    }

    fn make(&self, kind: TokenKind, value: Option<TokenValue>, start: u32, end: u32) -> Token {
        Token::new(kind, value, self.loc(Span::new(start, end)))
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        self.make(kind, None, start, self.cursor.pos())
    }

    fn push_error(&mut self, kind: LexErrorKind, start: u32, end: u32) {
        self.errors.push(LexError::new(kind, self.loc(Span::new(start, end))));
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// Skip spaces, tabs, and comments, but stop at a newline -- newlines
    /// are handled by the caller since they may need ASI resolution.
    fn skip_non_newline_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c == ' ' || c == '\t');
            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some('/'), Some('/')) => {
                    self.cursor.eat_while(|c| c != '\n' && c != '\r');
                }
                (Some('/'), Some('*')) => {
                    let start = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    self.skip_block_comment(start);
                }
                _ => break,
            }
        }
    }

    /// Skip a nestable `/* ... */` block comment. The opening `/*` has
    /// already been consumed.
    fn skip_block_comment(&mut self, start: u32) {
        let mut depth: u32 = 1;
        loop {
            match self.cursor.peek() {
                None => {
                    self.push_error(LexErrorKind::UnterminatedBlockComment, start, self.cursor.pos());
                    return;
                }
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Token production ───────────────────────────────────────────────

    /// Produce the next token straight from the cursor, with no ASI
    /// resolution: a newline becomes a raw `Newline` token.
    fn raw_token(&mut self) -> Token {
        self.skip_non_newline_trivia();
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return self.make(TokenKind::Eof, None, start, start);
        };

        match c {
            '\n' => {
                self.cursor.advance();
                self.make(TokenKind::Newline, None, start, self.cursor.pos())
            }
            '\r' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
                self.make(TokenKind::Newline, None, start, self.cursor.pos())
            }

            '(' => {
                self.context_stack.push(LexContext::Paren);
                self.single(TokenKind::LParen, start)
            }
            ')' => {
                if matches!(self.context_stack.last(), Some(LexContext::Paren)) {
                    self.context_stack.pop();
                }
                self.single(TokenKind::RParen, start)
            }
            '[' => {
                self.context_stack.push(LexContext::Bracket);
                self.single(TokenKind::LBracket, start)
            }
            ']' => {
                if matches!(self.context_stack.last(), Some(LexContext::Bracket)) {
                    self.context_stack.pop();
                }
                self.single(TokenKind::RBracket, start)
            }
            '{' => {
                self.context_stack.push(LexContext::Block);
                self.single(TokenKind::LBrace, start)
            }
            '}' => {
                if matches!(
                    self.context_stack.last(),
                    Some(LexContext::Block) | Some(LexContext::Record)
                ) {
                    self.context_stack.pop();
                }
                self.single(TokenKind::RBrace, start)
            }

            ',' => self.single(TokenKind::Comma, start),
            ';' => self.single(TokenKind::Semicolon, start),

            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_amp(start),
            '|' => self.lex_pipe(start),
            '-' => self.lex_minus(start),
            ':' => self.lex_colon(start),
            '.' => self.lex_dot(start),
            '+' => self.single(TokenKind::OpPlus, start),
            '*' => self.single(TokenKind::OpStar, start),
            '/' => self.single(TokenKind::OpSlash, start),
            '%' => self.single(TokenKind::OpPercent, start),

            '0'..='9' => self.lex_number(start),
            '"' => self.lex_string(start),

            c if is_ident_start(c) => self.lex_ident(start),

            _ => {
                self.cursor.advance();
                self.push_error(LexErrorKind::UnexpectedCharacter(c), start, self.cursor.pos());
                self.make(TokenKind::Error, None, start, self.cursor.pos())
            }
        }
    }

    // ── Multi-character operators ──────────────────────────────────────

    /// `=>` is the only valid use of a bare `=`; `==` is equality.
    /// Bare `=` is the declaration separator; `==` is equality; `=>`
    /// introduces a lambda or match-arm body.
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.make(TokenKind::OpEq, None, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                self.make(TokenKind::FatArrow, None, start, self.cursor.pos())
            }
            _ => self.make(TokenKind::OpAssign, None, start, self.cursor.pos()),
        }
    }

    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.make(TokenKind::OpNeq, None, start, self.cursor.pos())
        } else {
            self.make(TokenKind::OpBang, None, start, self.cursor.pos())
        }
    }

    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.make(TokenKind::OpLte, None, start, self.cursor.pos())
            }
            Some('<') => {
                self.cursor.advance();
                self.make(TokenKind::OpLtLt, None, start, self.cursor.pos())
            }
            _ => self.make(TokenKind::OpLt, None, start, self.cursor.pos()),
        }
    }

    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.make(TokenKind::OpGte, None, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                self.make(TokenKind::OpGtGt, None, start, self.cursor.pos())
            }
            _ => self.make(TokenKind::OpGt, None, start, self.cursor.pos()),
        }
    }

    /// `&&` is logical AND, single `&` is string concatenation.
    fn lex_amp(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('&') {
            self.cursor.advance();
            self.make(TokenKind::OpAnd, None, start, self.cursor.pos())
        } else {
            self.make(TokenKind::OpAmpersand, None, start, self.cursor.pos())
        }
    }

    /// `||` is logical OR, `|>` is pipe, single `|` is the pattern/variant bar.
    fn lex_pipe(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('|') => {
                self.cursor.advance();
                self.make(TokenKind::OpOr, None, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                self.make(TokenKind::OpPipeGt, None, start, self.cursor.pos())
            }
            _ => self.make(TokenKind::Pipe, None, start, self.cursor.pos()),
        }
    }

    fn lex_minus(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            self.make(TokenKind::ThinArrow, None, start, self.cursor.pos())
        } else {
            self.make(TokenKind::OpMinus, None, start, self.cursor.pos())
        }
    }

    /// `:=` is the reference-assignment operator, `::` is cons, single `:`
    /// is type annotation.
    fn lex_colon(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.make(TokenKind::RefAssign, None, start, self.cursor.pos())
            }
            Some(':') => {
                self.cursor.advance();
                self.make(TokenKind::OpCons, None, start, self.cursor.pos())
            }
            _ => self.make(TokenKind::Colon, None, start, self.cursor.pos()),
        }
    }

    /// `...` is the record-spread ellipsis, single `.` is field access.
    fn lex_dot(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
            self.cursor.advance();
            self.cursor.advance();
            self.make(TokenKind::Ellipsis, None, start, self.cursor.pos())
        } else {
            self.make(TokenKind::Dot, None, start, self.cursor.pos())
        }
    }

    // ── Numbers ────────────────────────────────────────────────────────

    fn lex_number(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();

        if first == '0' {
            match self.cursor.peek() {
                Some('x' | 'X') => return self.lex_radix_int(start, 16),
                Some('o' | 'O') => return self.lex_radix_int(start, 8),
                Some('b' | 'B') => return self.lex_radix_int(start, 2),
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        let mut is_float = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            is_float = true;
            self.lex_exponent();
        }

        let end = self.cursor.pos();
        let text = strip_underscores(self.cursor.slice(start, end));

        if is_float {
            match text.parse::<f64>() {
                Ok(v) => self.make(TokenKind::FloatLiteral, Some(TokenValue::Float(v)), start, end),
                Err(_) => {
                    self.push_error(LexErrorKind::InvalidNumberLiteral(text), start, end);
                    self.make(TokenKind::Error, None, start, end)
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => self.make(TokenKind::IntLiteral, Some(TokenValue::Int(v)), start, end),
                // An integer literal that overflows i64 is accepted and
                // represented as a float rather than rejected outright.
                Err(_) => match text.parse::<f64>() {
                    Ok(v) => self.make(TokenKind::FloatLiteral, Some(TokenValue::Float(v)), start, end),
                    Err(_) => {
                        self.push_error(LexErrorKind::InvalidNumberLiteral(text), start, end);
                        self.make(TokenKind::Error, None, start, end)
                    }
                },
            }
        }
    }

    fn lex_radix_int(&mut self, start: u32, radix: u32) -> Token {
        self.cursor.advance(); // x/o/b
        match radix {
            16 => self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_'),
            8 => self.cursor.eat_while(|c| matches!(c, '0'..='7' | '_')),
            2 => self.cursor.eat_while(|c| matches!(c, '0' | '1' | '_')),
            _ => unreachable!(),
        }
        let end = self.cursor.pos();
        let digits = strip_underscores(self.cursor.slice(start + 2, end));
        match u64::from_str_radix(&digits, radix) {
            Ok(v) => self.make(TokenKind::IntLiteral, Some(TokenValue::Int(v as i64)), start, end),
            Err(_) => {
                let text = self.cursor.slice(start, end).to_string();
                self.push_error(LexErrorKind::InvalidNumberLiteral(text), start, end);
                self.make(TokenKind::Error, None, start, end)
            }
        }
    }

    fn lex_exponent(&mut self) {
        self.cursor.advance(); // e/E
        if matches!(self.cursor.peek(), Some('+' | '-')) {
            self.cursor.advance();
        }
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
    }

    // ── Strings ────────────────────────────────────────────────────────

    /// Lex a `"..."` string literal, decoding escapes as it goes. Supports
    /// `\n \t \r \" \\` and `\u{HEX}` escapes; every other code point is
    /// preserved verbatim.
    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening quote
        let mut decoded = String::new();

        loop {
            match self.cursor.peek() {
                None => {
                    self.push_error(LexErrorKind::UnterminatedString, start, self.cursor.pos());
                    return self.make(TokenKind::Error, None, start, self.cursor.pos());
                }
                Some('"') => {
                    self.cursor.advance();
                    let end = self.cursor.pos();
                    return self.make(TokenKind::StringLiteral, Some(TokenValue::Str(decoded)), start, end);
                }
                Some('\\') => {
                    let esc_start = self.cursor.pos();
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some('n') => {
                            self.cursor.advance();
                            decoded.push('\n');
                        }
                        Some('t') => {
                            self.cursor.advance();
                            decoded.push('\t');
                        }
                        Some('r') => {
                            self.cursor.advance();
                            decoded.push('\r');
                        }
                        Some('"') => {
                            self.cursor.advance();
                            decoded.push('"');
                        }
                        Some('\\') => {
                            self.cursor.advance();
                            decoded.push('\\');
                        }
                        Some('u') => {
                            self.cursor.advance();
                            self.lex_unicode_escape(esc_start, &mut decoded);
                        }
                        Some(other) => {
                            self.cursor.advance();
                            self.push_error(LexErrorKind::InvalidEscapeSequence(other), esc_start, self.cursor.pos());
                            decoded.push(other);
                        }
                        None => {
                            self.push_error(LexErrorKind::UnterminatedString, start, self.cursor.pos());
                            return self.make(TokenKind::Error, None, start, self.cursor.pos());
                        }
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    decoded.push(c);
                }
            }
        }
    }

    /// Lex a `\u{HEX}` escape; the `\u` has already been consumed.
    fn lex_unicode_escape(&mut self, esc_start: u32, decoded: &mut String) {
        if self.cursor.peek() != Some('{') {
            self.push_error(LexErrorKind::InvalidEscapeSequence('u'), esc_start, self.cursor.pos());
            return;
        }
        self.cursor.advance(); // {
        let hex_start = self.cursor.pos();
        self.cursor.eat_while(|c| c.is_ascii_hexdigit());
        let hex = self.cursor.slice(hex_start, self.cursor.pos()).to_string();

        if self.cursor.peek() != Some('}') {
            self.push_error(LexErrorKind::InvalidUnicodeEscape(hex), esc_start, self.cursor.pos());
            return;
        }
        self.cursor.advance(); // }

        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
            Some(c) => decoded.push(c),
            None => self.push_error(LexErrorKind::InvalidUnicodeEscape(hex), esc_start, self.cursor.pos()),
        }
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let end = self.cursor.pos();
        let text = self.cursor.slice(start, end);

        match keyword_from_str(text) {
            Some(TokenKind::BoolLiteral) => {
                self.make(TokenKind::BoolLiteral, Some(TokenValue::Bool(text == "true")), start, end)
            }
            Some(kind) => self.make(kind, None, start, end),
            None => self.make(TokenKind::Identifier, Some(TokenValue::Ident(text.to_string())), start, end),
        }
    }

    // ── Automatic semicolon insertion ──────────────────────────────────

    fn next_token(&mut self) -> Token {
        if let Some(tok) = self.pending.pop_front() {
            self.prev_kind = Some(tok.kind);
            return tok;
        }

        let tok = self.raw_token();
        if tok.kind == TokenKind::Newline {
            return self.resolve_newline(tok);
        }

        self.prev_kind = Some(tok.kind);
        tok
    }

    /// Collapse a run of newlines into at most one `Semicolon`, applying
    /// the terminator/continuation ASI rule, gated by the context active
    /// when the run began.
    fn resolve_newline(&mut self, first_newline: Token) -> Token {
        let ctx = *self.context_stack.last().expect("context stack must never be empty");
        let mut newline_loc = first_newline.location;

        loop {
            let tok = self.raw_token();
            if tok.kind == TokenKind::Newline {
                newline_loc = newline_loc.merge(&tok.location);
                continue;
            }
            return self.decide_asi(ctx, newline_loc, tok);
        }
    }

    fn decide_asi(&mut self, ctx: LexContext, newline_loc: Location, next_tok: Token) -> Token {
        let suppressed_by_context = matches!(ctx, LexContext::Paren | LexContext::Bracket | LexContext::Record);
        let prev_terminates = self.prev_kind.map(is_terminator).unwrap_or(false);
        let next_continues = is_continuation(next_tok.kind);

        if !suppressed_by_context && prev_terminates && !next_continues {
            self.pending.push_back(next_tok);
            self.prev_kind = Some(TokenKind::Semicolon);
            Token::new(TokenKind::Semicolon, None, newline_loc)
        } else {
            self.prev_kind = Some(next_tok.kind);
            next_tok
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}

/// Token kinds after which a line break can plausibly end a statement.
fn is_terminator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::BoolLiteral
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::OpBang
    )
}

/// Token kinds that, appearing right after a newline, mean the newline
/// continues the previous expression rather than ending a statement.
fn is_continuation(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::FatArrow
            | TokenKind::OpPlus
            | TokenKind::OpMinus
            | TokenKind::OpStar
            | TokenKind::OpSlash
            | TokenKind::OpPercent
            | TokenKind::OpEq
            | TokenKind::OpNeq
            | TokenKind::OpLt
            | TokenKind::OpLte
            | TokenKind::OpGt
            | TokenKind::OpGte
            | TokenKind::OpAnd
            | TokenKind::OpOr
            | TokenKind::OpPipeGt
            | TokenKind::OpGtGt
            | TokenKind::OpLtLt
            | TokenKind::OpCons
            | TokenKind::OpAmpersand
            | TokenKind::Dot
            | TokenKind::LParen
            | TokenKind::Pipe
            | TokenKind::Then
            | TokenKind::Else
            | TokenKind::And
            | TokenKind::When
    )
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|&c| c != '_').collect()
}

const EMOJI_RANGES: &[(u32, u32)] = &[(0x2600, 0x27BF), (0x1F300, 0x1FAFF), (0x1F1E6, 0x1F1FF)];

fn is_extra_ident_char(c: char) -> bool {
    let cp = c as u32;
    cp == 0xFE0F || EMOJI_RANGES.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

fn is_ident_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c) || is_extra_ident_char(c)
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_continue(c) || is_extra_ident_char(c)
}
