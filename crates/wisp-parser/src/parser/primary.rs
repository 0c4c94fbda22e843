//! Primary expressions: literals, grouping, list/record/tuple literals,
//! and the compound forms (`if`, `match`, blocks, `unsafe`).
//!
//! # Disambiguating `{`
//!
//! A `{` is lexed as the start of a block by default. Looking at most two
//! tokens past it tells us otherwise:
//!
//! - `{}` or `{ ...` -- empty record or a spread-based record update.
//! - `IDENT ,` / `IDENT }` / `IDENT :` (a name immediately followed by a
//!   field separator or the closing brace) -- a record literal.
//! - anything else -- a block of semicolon/newline-separated statements.
//!
//! Once a `{` is confirmed to open a record, [`Parser::switch_to_record_context`]
//! tells the lexer so that further newlines inside it are insignificant,
//! matching comma-separated field syntax rather than statement syntax.

use wisp_common::span::Location;
use wisp_common::token::{TokenKind, TokenValue};

use crate::ast::{Expr, MatchArm, Pattern, RecordField};

use super::{expressions, patterns, token_name, PResult, Parser};

pub(crate) fn parse_primary(p: &mut Parser) -> PResult<Expr> {
    match p.current_kind() {
        TokenKind::IntLiteral => {
            let tok = p.bump();
            let Some(TokenValue::Int(value)) = tok.value else { unreachable!() };
            Ok(Expr::IntLit { value, location: tok.location })
        }
        TokenKind::FloatLiteral => {
            let tok = p.bump();
            let Some(TokenValue::Float(value)) = tok.value else { unreachable!() };
            Ok(Expr::FloatLit { value, location: tok.location })
        }
        TokenKind::StringLiteral => {
            let tok = p.bump();
            let Some(TokenValue::Str(value)) = tok.value else { unreachable!() };
            Ok(Expr::StringLit { value, location: tok.location })
        }
        TokenKind::BoolLiteral => {
            let tok = p.bump();
            let Some(TokenValue::Bool(value)) = tok.value else { unreachable!() };
            Ok(Expr::BoolLit { value, location: tok.location })
        }
        TokenKind::Identifier => {
            let tok = p.bump();
            let name = token_name(&tok).expect("Identifier");
            Ok(Expr::Var { name, location: tok.location })
        }
        TokenKind::LParen => parse_paren_expr(p),
        TokenKind::LBracket => parse_list_expr(p),
        TokenKind::LBrace => parse_brace_expr(p),
        TokenKind::If => parse_if_expr(p),
        TokenKind::Match => parse_match_expr(p),
        TokenKind::Unsafe => parse_unsafe_expr(p),
        _ => Err(p.error_here("an expression")),
    }
}

/// `()` is the unit literal, `(e)` is `e` itself (no AST wrapper for
/// grouping), `(e1, e2, ...)` is a tuple -- unless a `=>` follows the
/// closing paren, in which case the whole list is reinterpreted as a
/// multi-parameter lambda's parameter list (the single-parameter case with
/// no parens is instead caught directly in `expressions::parse_expr`).
fn parse_paren_expr(p: &mut Parser) -> PResult<Expr> {
    let open = p.expect(TokenKind::LParen, "`(`")?;
    if let Some(close) = p.eat(TokenKind::RParen) {
        if p.at(TokenKind::FatArrow) {
            return parse_lambda_after_parens(p, Vec::new(), open.location);
        }
        return Ok(Expr::UnitLit { location: open.location.merge(&close.location) });
    }

    let items = p.allow_struct_lit(|p| {
        let mut items = vec![expressions::parse_expr(p)?];
        while p.eat(TokenKind::Comma).is_some() {
            if p.at(TokenKind::RParen) {
                break;
            }
            items.push(expressions::parse_expr(p)?);
        }
        Ok(items)
    })?;
    p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;

    if p.at(TokenKind::FatArrow) {
        return parse_lambda_after_parens(p, items, open.location);
    }

    if items.len() == 1 {
        Ok(items.into_iter().next().expect("len == 1"))
    } else {
        let location = open.location.merge(items.last().expect("len > 1").location());
        Ok(Expr::Tuple { items, location })
    }
}

/// Reinterpret an already-parsed parenthesized expression list as a
/// lambda's parameters, having just seen the `=>` that follows it.
fn parse_lambda_after_parens(p: &mut Parser, items: Vec<Expr>, open_loc: Location) -> PResult<Expr> {
    let params = items.into_iter().map(expr_to_param_pattern).collect::<PResult<Vec<_>>>()?;
    p.expect(TokenKind::FatArrow, "`=>`")?;
    let body = expressions::parse_expr(p)?;
    let location = open_loc.merge(body.location());
    Ok(Expr::Lambda { params, body: Box::new(body), location })
}

/// A lambda parameter reinterpreted from an expression parsed as if it were
/// a tuple element: only a bare name (including `_`) is valid here.
fn expr_to_param_pattern(expr: Expr) -> PResult<Pattern> {
    match expr {
        Expr::Var { name, location } if name == "_" => Ok(Pattern::Wildcard { location }),
        Expr::Var { name, location } => Ok(Pattern::Var { name, location }),
        other => Err(crate::error::ParseError::new(
            crate::error::ErrorKind::InvalidPatternInContext,
            other.location().clone(),
        )),
    }
}

fn parse_list_expr(p: &mut Parser) -> PResult<Expr> {
    let open = p.expect(TokenKind::LBracket, "`[`")?;
    let mut items = Vec::new();
    while !p.at(TokenKind::RBracket) {
        items.push(expressions::parse_expr(p)?);
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    let close = p.expect_closing(TokenKind::RBracket, "`]`", open.location.clone())?;
    Ok(Expr::List { items, location: open.location.merge(&close.location) })
}

fn parse_brace_expr(p: &mut Parser) -> PResult<Expr> {
    let open = p.expect(TokenKind::LBrace, "`{`")?;

    if p.at(TokenKind::Ellipsis) {
        p.switch_to_record_context();
        return parse_record_update(p, open.location);
    }
    if looks_like_record_fields(p) {
        p.switch_to_record_context();
        return parse_record_literal(p, open.location);
    }
    parse_block_body(p, open.location)
}

fn looks_like_record_fields(p: &mut Parser) -> bool {
    if p.at(TokenKind::RBrace) {
        return true;
    }
    token_name(p.current()).is_some()
        && matches!(p.peek(1).kind, TokenKind::Comma | TokenKind::RBrace | TokenKind::Colon)
}

fn parse_record_literal(p: &mut Parser, open_loc: Location) -> PResult<Expr> {
    let mut fields = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let name_tok = p.bump();
        let is_keyword = name_tok.kind != TokenKind::Identifier;
        let name = token_name(&name_tok).ok_or_else(|| p.error_here("a field name"))?;
        let location = name_tok.location.clone();

        let field = if p.eat(TokenKind::Colon).is_some() {
            let value = expressions::parse_expr(p)?;
            let location = location.merge(value.location());
            RecordField { name, value: Some(value), is_spread: false, location }
        } else {
            if is_keyword {
                return Err(crate::error::ParseError::new(
                    crate::error::ErrorKind::ReservedKeywordInShorthand { keyword: name },
                    name_tok.location,
                ));
            }
            RecordField { name, value: None, is_spread: false, location }
        };
        fields.push(field);
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    let close = p.expect_closing(TokenKind::RBrace, "`}`", open_loc.clone())?;
    Ok(Expr::Record { fields, location: open_loc.merge(&close.location) })
}

/// `{ ...base, field: value, ...more }`. Every spread past the first is
/// folded into `base` at desugaring time; see [`crate::desugar`].
fn parse_record_update(p: &mut Parser, open_loc: Location) -> PResult<Expr> {
    p.expect(TokenKind::Ellipsis, "`...`")?;
    let base = expressions::parse_expr(p)?;
    let mut fields = Vec::new();

    while p.eat(TokenKind::Comma).is_some() {
        if p.at(TokenKind::RBrace) {
            break;
        }
        if p.eat(TokenKind::Ellipsis).is_some() {
            let spread = expressions::parse_expr(p)?;
            let location = spread.location().clone();
            fields.push(RecordField { name: String::new(), value: Some(spread), is_spread: true, location });
            continue;
        }
        let name_tok = p.bump();
        let name = token_name(&name_tok).ok_or_else(|| p.error_here("a field name"))?;
        p.expect(TokenKind::Colon, "`:`")?;
        let value = expressions::parse_expr(p)?;
        let location = name_tok.location.merge(value.location());
        fields.push(RecordField { name, value: Some(value), is_spread: false, location });
    }

    let close = p.expect_closing(TokenKind::RBrace, "`}`", open_loc.clone())?;
    Ok(Expr::RecordUpdate { base: Box::new(base), fields, location: open_loc.merge(&close.location) })
}

/// A block is a `;`/newline-separated sequence of expressions; its value
/// is that of its last statement.
fn parse_block_body(p: &mut Parser, open_loc: Location) -> PResult<Expr> {
    let mut statements = Vec::new();
    p.skip_extra_terminators();
    while !p.at(TokenKind::RBrace) {
        statements.push(expressions::parse_expr(p)?);
        if p.at(TokenKind::RBrace) {
            break;
        }
        p.expect_terminator()?;
        p.skip_extra_terminators();
    }
    let close = p.expect_closing(TokenKind::RBrace, "`}`", open_loc.clone())?;
    Ok(Expr::Block { statements, location: open_loc.merge(&close.location) })
}

fn parse_if_expr(p: &mut Parser) -> PResult<Expr> {
    let if_tok = p.expect(TokenKind::If, "`if`")?;
    // No struct-literal restriction needed here: `then` disambiguates the
    // condition from the branch, unlike `match`, whose own body delimiter
    // is the same `{` a trailing record/block argument would start with.
    let cond = expressions::parse_expr(p)?;
    p.expect(TokenKind::Then, "`then`")?;
    let then_branch = expressions::parse_expr(p)?;
    let (else_branch, end_loc) = if p.eat(TokenKind::Else).is_some() {
        let else_branch = expressions::parse_expr(p)?;
        let loc = else_branch.location().clone();
        (Some(Box::new(else_branch)), loc)
    } else {
        (None, then_branch.location().clone())
    };
    let location = if_tok.location.merge(&end_loc);
    Ok(Expr::If { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch, location })
}

/// `match scrutinee { | pat => body | pat when guard => body ... }`. Every
/// arm starts with a leading `|`, including the first: this is what lets
/// the lexer tell a fresh arm from a continuation of the previous one.
/// The arm body arrow is `=>`, the same token a lambda uses -- `->` is
/// reserved for the type parser's function arrow.
fn parse_match_expr(p: &mut Parser) -> PResult<Expr> {
    let match_tok = p.expect(TokenKind::Match, "`match`")?;
    let scrutinee = p.forbid_struct_lit(expressions::parse_expr)?;
    let open = p.expect(TokenKind::LBrace, "`{`")?;
    // No record-context switch needed here: a leading `|` is already a
    // lexer-level ASI continuation token, so arm boundaries never get a
    // spurious semicolon regardless of how this brace is classified.
    let mut arms = Vec::new();
    while p.eat(TokenKind::Pipe).is_some() {
        let pattern = patterns::parse_pattern(p)?;
        let guard = if p.eat(TokenKind::When).is_some() { Some(expressions::parse_expr(p)?) } else { None };
        p.expect(TokenKind::FatArrow, "`=>`")?;
        let body = expressions::parse_expr(p)?;
        let location = pattern.location().merge(body.location());
        arms.push(MatchArm { pattern, guard, body, location });
    }

    let close = p.expect_closing(TokenKind::RBrace, "`}`", open.location.clone())?;
    Ok(Expr::Match { scrutinee: Box::new(scrutinee), arms, location: match_tok.location.merge(&close.location) })
}

fn parse_unsafe_expr(p: &mut Parser) -> PResult<Expr> {
    let unsafe_tok = p.expect(TokenKind::Unsafe, "`unsafe`")?;
    let body = expressions::parse_expr(p)?;
    let location = unsafe_tok.location.merge(body.location());
    Ok(Expr::Unsafe { body: Box::new(body), location })
}
