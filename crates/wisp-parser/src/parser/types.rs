//! Type expression parser.
//!
//! Grammar, loosest to tightest:
//!
//! ```text
//! type       := fn_type
//! fn_type    := app ("->" type)?                      -- right-associative
//! app        := Const ("<" type ("," type)* ">")?      -- generic application
//!             | Var | "{" fields "}" | "(" tuple ")"
//! ```
//!
//! A bare identifier starting uppercase is a `Const` (`Int`, `Option`); one
//! starting lowercase is a `Var` (a type variable, `a`, `t`). Only `Const`
//! may carry a `<...>` argument list; `List Int Int`-style juxtaposition is
//! not part of this grammar.

use wisp_common::token::TokenKind;

use crate::ast::{Location, RecordFieldType, TypeExpr};

use super::{token_name, PResult, Parser};

pub(crate) fn parse_type_expr(p: &mut Parser) -> PResult<TypeExpr> {
    parse_fn_type(p)
}

fn parse_fn_type(p: &mut Parser) -> PResult<TypeExpr> {
    let param = parse_type_app(p)?;
    if p.eat(TokenKind::ThinArrow).is_some() {
        let ret = parse_fn_type(p)?;
        let location = param.location().merge(ret.location());
        Ok(TypeExpr::Fn { param: Box::new(param), ret: Box::new(ret), location })
    } else {
        Ok(param)
    }
}

fn parse_type_app(p: &mut Parser) -> PResult<TypeExpr> {
    match p.current_kind() {
        TokenKind::Identifier => parse_ident_type(p),
        _ => parse_type_atom(p),
    }
}

/// An identifier in type position: the opaque-type sentinel `Type`, a
/// `Const` (optionally with a `<...>` argument list), or a `Var`.
fn parse_ident_type(p: &mut Parser) -> PResult<TypeExpr> {
    let tok = p.bump();
    let location = tok.location.clone();
    let name = token_name(&tok).expect("Identifier token always carries a name");

    if name == "Type" {
        return Ok(TypeExpr::Opaque { location });
    }
    if !is_const_name(&name) {
        return Ok(TypeExpr::Var { name, location });
    }
    if p.eat(TokenKind::OpLt).is_some() {
        let (args, close_loc) = parse_type_arg_list(p)?;
        Ok(TypeExpr::App { constructor: name, args, location: location.merge(&close_loc) })
    } else {
        Ok(TypeExpr::Const { name, location })
    }
}

fn is_const_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// `<' type (',' type)* '>`, with the opening `<` already consumed. Closes
/// via [`Parser::expect_close_angle`], which splits a composite `>>`/`>=`
/// token so nested generics (`Option<List<T>>`) parse correctly.
fn parse_type_arg_list(p: &mut Parser) -> PResult<(Vec<TypeExpr>, Location)> {
    let mut args = Vec::new();
    loop {
        args.push(parse_type_expr(p)?);
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    let close = p.expect_close_angle()?;
    Ok((args, close.location))
}

pub(crate) fn starts_type_atom(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::LBrace | TokenKind::LParen)
}

/// An atom is a standalone type with no application of its own: a bare
/// name, a record type, or a parenthesized (possibly tuple) type.
pub(crate) fn parse_type_atom(p: &mut Parser) -> PResult<TypeExpr> {
    match p.current_kind() {
        TokenKind::Identifier => parse_ident_type(p),
        TokenKind::LBrace => parse_record_type(p),
        TokenKind::LParen => parse_paren_type(p),
        _ => Err(p.error_here("a type")),
    }
}

fn parse_record_type(p: &mut Parser) -> PResult<TypeExpr> {
    let open = p.expect(TokenKind::LBrace, "`{`")?;
    let mut fields = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let name_tok = p.bump();
        let name = token_name(&name_tok).ok_or_else(|| p.error_here("a field name"))?;
        p.expect(TokenKind::Colon, "`:`")?;
        let type_expr = parse_type_expr(p)?;
        let location = name_tok.location.merge(type_expr.location());
        fields.push(RecordFieldType { name, type_expr, location });
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    let close = p.expect_closing(TokenKind::RBrace, "`}`", open.location.clone())?;
    Ok(TypeExpr::Record { fields, location: open.location.merge(&close.location) })
}

/// `()` is the zero-element tuple (the unit type), `(T)` is `T` itself
/// (grouping, not a one-element tuple), and `(T1, T2, ...)` is a tuple.
fn parse_paren_type(p: &mut Parser) -> PResult<TypeExpr> {
    let open = p.expect(TokenKind::LParen, "`(`")?;
    if let Some(close) = p.eat(TokenKind::RParen) {
        return Ok(TypeExpr::Tuple { items: Vec::new(), location: open.location.merge(&close.location) });
    }

    let first = parse_type_expr(p)?;
    if p.at(TokenKind::Comma) {
        let mut items = vec![first];
        while p.eat(TokenKind::Comma).is_some() {
            if p.at(TokenKind::RParen) {
                break;
            }
            items.push(parse_type_expr(p)?);
        }
        let close = p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
        Ok(TypeExpr::Tuple { items, location: open.location.merge(&close.location) })
    } else {
        p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
        Ok(first)
    }
}
