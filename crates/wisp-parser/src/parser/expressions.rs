//! Expression parser: recursive-descent precedence climbing.
//!
//! Levels, loosest to tightest (lambda sits above all of them: it is
//! detected by lookahead rather than climbed into, since its body is
//! itself a full expression):
//!
//! ```text
//! lambda        IDENT "=>" expr             -- single bare param
//! assign        :=                           right-assoc
//! annotation    :           expr : Type
//! pipe          |>          left-assoc
//! compose       >> <<       left-assoc
//! or            ||
//! and           &&
//! equality      == !=
//! comparison    < <= > >=
//! cons          ::          right-assoc
//! concat        &
//! additive      + -
//! multiplicative * / %
//! unary         - !         prefix
//! postfix       call `(...)`, access `.f`, deref `!`   left-assoc
//! primary       literals, identifiers, grouping, if/match/block/unsafe
//! ```
//!
//! There is no separate "application by juxtaposition" level: a call is a
//! postfix form, `f(a, b)`, chained the same way `.field` access is.
//! Multi-parameter lambdas (`(a, b) => ...`) are detected inside the
//! parenthesized-expression rule at the primary level, not here.

use wisp_common::token::TokenKind;

use crate::ast::{BinOpKind, Expr, Pattern, UnaryOpKind};

use super::{primary, types, PResult, Parser};

pub(crate) fn parse_expr(p: &mut Parser) -> PResult<Expr> {
    if looks_like_lambda(p) {
        parse_lambda(p)
    } else {
        parse_assign(p)
    }
}

/// A lambda is committed to only on `IDENTIFIER FAT_ARROW`: a single bare
/// parameter with no parens. `f(x)` and `f => x` are unambiguous from this
/// alone; multi-parameter lambdas are instead recognized by
/// [`primary::parse_paren_expr`] after it has already parsed `(a, b, ...)`.
fn looks_like_lambda(p: &mut Parser) -> bool {
    p.current_kind() == TokenKind::Identifier && p.peek(1).kind == TokenKind::FatArrow
}

fn parse_lambda(p: &mut Parser) -> PResult<Expr> {
    let tok = p.bump();
    let name = super::token_name(&tok).expect("Identifier");
    let param_loc = tok.location;
    let param = if name == "_" {
        Pattern::Wildcard { location: param_loc }
    } else {
        Pattern::Var { name, location: param_loc }
    };
    p.expect(TokenKind::FatArrow, "`=>`")?;
    let body = parse_expr(p)?;
    let location = param.location().merge(body.location());
    Ok(Expr::Lambda { params: vec![param], body: Box::new(body), location })
}

fn parse_assign(p: &mut Parser) -> PResult<Expr> {
    let lhs = parse_type_annotation(p)?;
    if p.eat(TokenKind::RefAssign).is_some() {
        let rhs = parse_assign(p)?;
        let location = lhs.location().merge(rhs.location());
        Ok(Expr::BinOp { op: BinOpKind::Assign, lhs: Box::new(lhs), rhs: Box::new(rhs), location })
    } else {
        Ok(lhs)
    }
}

fn parse_type_annotation(p: &mut Parser) -> PResult<Expr> {
    let expr = parse_pipe(p)?;
    if p.eat(TokenKind::Colon).is_some() {
        let type_expr = types::parse_type_expr(p)?;
        let location = expr.location().merge(type_expr.location());
        Ok(Expr::TypeAnnotation { expr: Box::new(expr), type_expr, location })
    } else {
        Ok(expr)
    }
}

fn parse_pipe(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_compose(p)?;
    while p.eat(TokenKind::OpPipeGt).is_some() {
        let rhs = parse_compose(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::Pipe { lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_compose(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_or(p)?;
    loop {
        let op = match p.current_kind() {
            TokenKind::OpGtGt => BinOpKind::Compose,
            TokenKind::OpLtLt => BinOpKind::ComposeRev,
            _ => break,
        };
        p.bump();
        let rhs = parse_or(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_or(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_and(p)?;
    while p.eat(TokenKind::OpOr).is_some() {
        let rhs = parse_and(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op: BinOpKind::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_and(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_eq(p)?;
    while p.eat(TokenKind::OpAnd).is_some() {
        let rhs = parse_eq(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op: BinOpKind::And, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_eq(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_cmp(p)?;
    loop {
        let op = match p.current_kind() {
            TokenKind::OpEq => BinOpKind::Eq,
            TokenKind::OpNeq => BinOpKind::Neq,
            _ => break,
        };
        p.bump();
        let rhs = parse_cmp(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_cmp(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_cons(p)?;
    loop {
        let op = match p.current_kind() {
            TokenKind::OpLt => BinOpKind::Lt,
            TokenKind::OpLte => BinOpKind::Lte,
            TokenKind::OpGt => BinOpKind::Gt,
            TokenKind::OpGte => BinOpKind::Gte,
            _ => break,
        };
        p.bump();
        let rhs = parse_cons(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

/// `::` is right-associative, matching its reading as list cons:
/// `1 :: 2 :: xs` is `1 :: (2 :: xs)`.
fn parse_cons(p: &mut Parser) -> PResult<Expr> {
    let lhs = parse_concat(p)?;
    if p.eat(TokenKind::OpCons).is_some() {
        let rhs = parse_cons(p)?;
        let location = lhs.location().merge(rhs.location());
        Ok(Expr::BinOp { op: BinOpKind::Cons, lhs: Box::new(lhs), rhs: Box::new(rhs), location })
    } else {
        Ok(lhs)
    }
}

fn parse_concat(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_add(p)?;
    while p.eat(TokenKind::OpAmpersand).is_some() {
        let rhs = parse_add(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op: BinOpKind::Concat, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_add(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_mul(p)?;
    loop {
        let op = match p.current_kind() {
            TokenKind::OpPlus => BinOpKind::Add,
            TokenKind::OpMinus => BinOpKind::Sub,
            _ => break,
        };
        p.bump();
        let rhs = parse_mul(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_mul(p: &mut Parser) -> PResult<Expr> {
    let mut lhs = parse_unary(p)?;
    loop {
        let op = match p.current_kind() {
            TokenKind::OpStar => BinOpKind::Mul,
            TokenKind::OpSlash => BinOpKind::Div,
            TokenKind::OpPercent => BinOpKind::Mod,
            _ => break,
        };
        p.bump();
        let rhs = parse_unary(p)?;
        let location = lhs.location().merge(rhs.location());
        lhs = Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs), location };
    }
    Ok(lhs)
}

fn parse_unary(p: &mut Parser) -> PResult<Expr> {
    let op = match p.current_kind() {
        TokenKind::OpMinus => UnaryOpKind::Neg,
        TokenKind::OpBang => UnaryOpKind::Not,
        _ => return parse_postfix(p),
    };
    let op_tok = p.bump();
    let operand = parse_unary(p)?;
    let location = op_tok.location.merge(operand.location());
    Ok(Expr::UnaryOp { op, operand: Box::new(operand), location })
}

/// `f(a, b)(c).field!` chains call, access, and deref without limit, all
/// left-associative and tighter than unary. A bare `f` with no trailing
/// `(`/`.`/`!` is just the primary expression itself -- this grammar has
/// no application by juxtaposition.
fn parse_postfix(p: &mut Parser) -> PResult<Expr> {
    let mut expr = primary::parse_primary(p)?;
    loop {
        match p.current_kind() {
            TokenKind::LParen => {
                let open = p.bump();
                let mut args = Vec::new();
                p.allow_struct_lit(|p| {
                    while !p.at(TokenKind::RParen) {
                        args.push(parse_expr(p)?);
                        if p.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    Ok(())
                })?;
                let close = p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
                let location = expr.location().merge(&close.location);
                expr = Expr::App { func: Box::new(expr), args, location };
            }
            TokenKind::Dot => {
                p.bump();
                let field_tok = p.bump();
                let field = super::token_name(&field_tok).ok_or_else(|| p.error_here("a field name"))?;
                let location = expr.location().merge(&field_tok.location);
                expr = Expr::RecordAccess { base: Box::new(expr), field, location };
            }
            TokenKind::OpBang => {
                let bang = p.bump();
                let location = expr.location().merge(&bang.location);
                expr = Expr::UnaryOp { op: UnaryOpKind::Deref, operand: Box::new(expr), location };
            }
            _ => break,
        }
    }
    Ok(expr)
}
