//! Pattern parser: match arms, `let` binders, and lambda parameters.
//!
//! A leading-uppercase identifier names a variant constructor (`Some`,
//! `Cons`, `None`); anything else is a variable binding, except for the
//! single underscore `_`, which is the wildcard. A constructor may be
//! applied to further pattern atoms by juxtaposition, the same convention
//! expression-level application uses.

use wisp_common::token::{TokenKind, TokenValue};

use crate::ast::{FieldPattern, LiteralPattern, Pattern};

use super::{token_name, PResult, Parser};

pub(crate) fn parse_pattern(p: &mut Parser) -> PResult<Pattern> {
    match p.current_kind() {
        TokenKind::Identifier if is_constructor_name(ident_peek(p)) => parse_constructor_pattern(p),
        TokenKind::Identifier => parse_ident_pattern(p),
        TokenKind::OpMinus => parse_negative_literal_pattern(p),
        TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::StringLiteral
        | TokenKind::BoolLiteral => parse_literal_pattern(p),
        TokenKind::LBrace => parse_record_pattern(p),
        TokenKind::LBracket => parse_list_pattern(p),
        TokenKind::LParen => parse_paren_pattern(p),
        _ => Err(p.error_here("a pattern")),
    }
}

/// Patterns that can stand alone as a constructor argument without parens:
/// everything except a bare constructor application (`Some x y` as an
/// argument must be written `(Some x y)`).
fn parse_pattern_atom(p: &mut Parser) -> PResult<Pattern> {
    match p.current_kind() {
        TokenKind::Identifier if is_constructor_name(ident_peek(p)) => {
            let tok = p.bump();
            let name = token_name(&tok).expect("Identifier");
            Ok(Pattern::Constructor { name, args: Vec::new(), location: tok.location })
        }
        _ => parse_pattern(p),
    }
}

fn ident_peek(p: &mut Parser) -> &str {
    match &p.current().value {
        Some(TokenValue::Ident(s)) => s.as_str(),
        _ => "",
    }
}

fn is_constructor_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn parse_ident_pattern(p: &mut Parser) -> PResult<Pattern> {
    let tok = p.bump();
    let name = token_name(&tok).expect("Identifier");
    let location = tok.location;
    if name == "_" {
        Ok(Pattern::Wildcard { location })
    } else {
        Ok(Pattern::Var { name, location })
    }
}

fn parse_constructor_pattern(p: &mut Parser) -> PResult<Pattern> {
    let tok = p.bump();
    let name = token_name(&tok).expect("Identifier");
    let location = tok.location;

    let mut args = Vec::new();
    while starts_pattern_atom(p.current_kind()) {
        args.push(parse_pattern_atom(p)?);
    }

    let location = match args.last() {
        Some(last) => location.merge(last.location()),
        None => location,
    };
    Ok(Pattern::Constructor { name, args, location })
}

fn starts_pattern_atom(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::BoolLiteral
            | TokenKind::LBrace
            | TokenKind::LBracket
            | TokenKind::LParen
    )
}

fn parse_literal_pattern(p: &mut Parser) -> PResult<Pattern> {
    let tok = p.bump();
    let location = tok.location.clone();
    let value = match (tok.kind, tok.value) {
        (TokenKind::IntLiteral, Some(TokenValue::Int(v))) => LiteralPattern::Int(v),
        (TokenKind::FloatLiteral, Some(TokenValue::Float(v))) => LiteralPattern::Float(v),
        (TokenKind::StringLiteral, Some(TokenValue::Str(v))) => LiteralPattern::Str(v),
        (TokenKind::BoolLiteral, Some(TokenValue::Bool(v))) => LiteralPattern::Bool(v),
        _ => unreachable!("parse_literal_pattern only called on literal tokens"),
    };
    Ok(Pattern::Literal { value, location })
}

fn parse_negative_literal_pattern(p: &mut Parser) -> PResult<Pattern> {
    let minus = p.bump();
    let inner = p.expect(TokenKind::IntLiteral, "a number").or_else(|_| {
        p.expect(TokenKind::FloatLiteral, "a number")
    })?;
    let location = minus.location.merge(&inner.location);
    let value = match inner.value {
        Some(TokenValue::Int(v)) => LiteralPattern::Int(-v),
        Some(TokenValue::Float(v)) => LiteralPattern::Float(-v),
        _ => unreachable!(),
    };
    Ok(Pattern::Literal { value, location })
}

/// `{ x, y: pat, ... }`. A trailing bare `...` marks `has_rest` and must be
/// the last entry: it has no binding of its own, it only says "there may be
/// more fields, ignore them".
fn parse_record_pattern(p: &mut Parser) -> PResult<Pattern> {
    let open = p.expect(TokenKind::LBrace, "`{`")?;
    p.switch_to_record_context();

    let mut fields = Vec::new();
    let mut has_rest = false;
    while !p.at(TokenKind::RBrace) {
        if p.at(TokenKind::Ellipsis) {
            p.bump();
            has_rest = true;
            break;
        }
        let name_tok = p.bump();
        let name = token_name(&name_tok).ok_or_else(|| p.error_here("a field name"))?;
        let mut location = name_tok.location;
        let pattern = if p.eat(TokenKind::Colon).is_some() {
            let inner = parse_pattern(p)?;
            location = location.merge(inner.location());
            Some(inner)
        } else {
            None
        };
        fields.push(FieldPattern { name, pattern, location });
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    let close = p.expect_closing(TokenKind::RBrace, "`}`", open.location.clone())?;
    Ok(Pattern::Record { fields, has_rest, location: open.location.merge(&close.location) })
}

/// `[a, b, ...rest]`. Unlike a record's rest marker, a list's `...` always
/// binds the remaining tail to a pattern.
fn parse_list_pattern(p: &mut Parser) -> PResult<Pattern> {
    let open = p.expect(TokenKind::LBracket, "`[`")?;
    let mut items = Vec::new();
    let mut rest = None;

    while !p.at(TokenKind::RBracket) {
        if p.eat(TokenKind::Ellipsis).is_some() {
            rest = Some(Box::new(parse_pattern(p)?));
            break;
        }
        items.push(parse_pattern(p)?);
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }

    let close = p.expect_closing(TokenKind::RBracket, "`]`", open.location.clone())?;
    Ok(Pattern::List { items, rest, location: open.location.merge(&close.location) })
}

/// `()` is the unit literal pattern, `(p)` is `p` itself, `(p1, p2, ...)`
/// is a tuple pattern.
fn parse_paren_pattern(p: &mut Parser) -> PResult<Pattern> {
    let open = p.expect(TokenKind::LParen, "`(`")?;
    if let Some(close) = p.eat(TokenKind::RParen) {
        return Ok(Pattern::Literal { value: LiteralPattern::Unit, location: open.location.merge(&close.location) });
    }

    let first = parse_pattern(p)?;
    if p.at(TokenKind::Comma) {
        let mut items = vec![first];
        while p.eat(TokenKind::Comma).is_some() {
            if p.at(TokenKind::RParen) {
                break;
            }
            items.push(parse_pattern(p)?);
        }
        let close = p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
        Ok(Pattern::Tuple { items, location: open.location.merge(&close.location) })
    } else {
        p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
        Ok(first)
    }
}
