//! Module-level declaration parser: `let`, `type`, `external`, `import`,
//! and `export` (including re-exports). Also the top-level
//! [`parse_module`] entry point the rest of the parser hangs off of.

use wisp_common::span::Location;
use wisp_common::token::{TokenKind, TokenValue};

use crate::ast::{
    Declaration, ExternalBlock, ExternalDecl, ExternalItem, ImportDecl, ImportItem, LetDecl,
    Module, Pattern, ReExportDecl, TypeDecl, TypeDefinition, VariantCase,
};
use crate::error::{ErrorKind, ParseError};

use super::{expressions, patterns, token_name, types, PResult, Parser};

pub(crate) fn parse_module(p: &mut Parser) -> PResult<Module> {
    let start_loc = p.current_location();
    let mut imports = Vec::new();
    let mut declarations = Vec::new();

    p.skip_extra_terminators();
    while !p.at(TokenKind::Eof) {
        let decl = parse_declaration(p)?;
        match &decl {
            Declaration::ImportDecl(_) | Declaration::ReExportDecl(_) => imports.push(decl),
            _ => declarations.push(decl),
        }
        if p.at(TokenKind::Eof) {
            break;
        }
        p.expect_terminator()?;
        p.skip_extra_terminators();
    }

    let location = start_loc.merge(&p.current_location());
    Ok(Module { imports, declarations, location })
}

fn parse_declaration(p: &mut Parser) -> PResult<Declaration> {
    match p.current_kind() {
        TokenKind::Let => parse_let_decl(p, false),
        TokenKind::Type => parse_type_decl(p, false),
        TokenKind::External => parse_external(p, false),
        TokenKind::Import => parse_import(p),
        TokenKind::Export => parse_export(p),
        _ => Err(p.error_here("a declaration")),
    }
}

/// `export` prefixes `let`/`type`/`external` to set their `exported` flag,
/// or introduces a re-export: `export { a, type T } from "./mod"` or the
/// namespace form `export * from "./mod"`.
fn parse_export(p: &mut Parser) -> PResult<Declaration> {
    let export_tok = p.expect(TokenKind::Export, "`export`")?;
    match p.current_kind() {
        TokenKind::Let => parse_let_decl(p, true),
        TokenKind::Type => parse_type_decl(p, true),
        TokenKind::External => parse_external(p, true),
        TokenKind::LBrace => parse_reexport_items(p, export_tok.location),
        TokenKind::OpStar => parse_reexport_star(p, export_tok.location),
        _ => Err(p.error_here("`let`, `type`, `external`, `{`, or `*` after `export`")),
    }
}

/// `let [rec] [mut] pattern [: Type] = value`. `rec` requires a plain
/// variable binder: a recursive destructuring pattern has no single name
/// to recurse through.
fn parse_let_decl(p: &mut Parser, exported: bool) -> PResult<Declaration> {
    let let_tok = p.expect(TokenKind::Let, "`let`")?;
    let recursive = p.eat(TokenKind::Rec).is_some();
    let mutable = p.eat(TokenKind::Mut).is_some();
    let pattern = patterns::parse_pattern(p)?;
    if recursive && !matches!(pattern, Pattern::Var { .. }) {
        return Err(ParseError::new(ErrorKind::InvalidPatternInContext, pattern.location().clone()));
    }

    let type_annotation = if p.eat(TokenKind::Colon).is_some() {
        Some(types::parse_type_expr(p)?)
    } else {
        None
    };

    p.expect(TokenKind::OpAssign, "`=`")?;
    let value = expressions::parse_expr(p)?;
    let location = let_tok.location.merge(value.location());
    Ok(Declaration::LetDecl(LetDecl { pattern, type_annotation, value, mutable, recursive, exported, location }))
}

/// `<T, U>`, with the opening `<` optional: returns `None` when the name
/// carries no generic parameter list at all.
fn parse_optional_type_params(p: &mut Parser) -> PResult<Option<Vec<String>>> {
    if p.eat(TokenKind::OpLt).is_none() {
        return Ok(None);
    }
    let mut params = Vec::new();
    loop {
        let tok = p.expect(TokenKind::Identifier, "a type parameter")?;
        params.push(token_name(&tok).expect("Identifier"));
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    p.expect_close_angle()?;
    Ok(Some(params))
}

fn parse_type_params(p: &mut Parser) -> PResult<Vec<String>> {
    Ok(parse_optional_type_params(p)?.unwrap_or_default())
}

/// `type Name<params> = TypeExpr`, with the RHS being a variant
/// (`| Case(...) | Case ...`), a record shape (`{ field: Type, ... }`,
/// folded directly into `TypeDefinition::Record` rather than wrapped as an
/// alias to a record type), or anything else as a plain alias.
fn parse_type_decl(p: &mut Parser, exported: bool) -> PResult<Declaration> {
    let type_tok = p.expect(TokenKind::Type, "`type`")?;
    let name_tok = p.expect(TokenKind::Identifier, "a type name")?;
    let name = token_name(&name_tok).expect("Identifier");

    let type_params = parse_type_params(p)?;

    p.expect(TokenKind::OpAssign, "`=`")?;

    let (definition, end_loc) = if p.at(TokenKind::Pipe) {
        parse_variant_cases(p)?
    } else {
        let type_expr = types::parse_type_expr(p)?;
        let end_loc = type_expr.location().clone();
        let definition = match type_expr {
            crate::ast::TypeExpr::Record { fields, .. } => TypeDefinition::Record(fields),
            other => TypeDefinition::Alias(other),
        };
        (definition, end_loc)
    };

    let location = type_tok.location.merge(&end_loc);
    Ok(Declaration::TypeDecl(TypeDecl { name, type_params, definition, exported, location }))
}

/// `| Name ('(' Type (',' Type)* ')')?`. A case with no parenthesized
/// argument list is a nullary constructor (`None`); its fields are empty.
fn parse_variant_cases(p: &mut Parser) -> PResult<(TypeDefinition, Location)> {
    let mut cases = Vec::new();
    let mut end_loc = p.current_location();
    while p.eat(TokenKind::Pipe).is_some() {
        let name_tok = p.expect(TokenKind::Identifier, "a case name")?;
        let name = token_name(&name_tok).expect("Identifier");
        let mut location = name_tok.location.clone();
        let mut fields = Vec::new();
        if let Some(open) = p.eat(TokenKind::LParen) {
            while !p.at(TokenKind::RParen) {
                fields.push(types::parse_type_expr(p)?);
                if p.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            let close = p.expect_closing(TokenKind::RParen, "`)`", open.location.clone())?;
            location = location.merge(&close.location);
        }
        end_loc = location.clone();
        cases.push(VariantCase { name, fields, location });
    }
    Ok((TypeDefinition::Variant(cases), end_loc))
}

fn parse_external(p: &mut Parser, exported: bool) -> PResult<Declaration> {
    let ext_tok = p.expect(TokenKind::External, "`external`")?;
    if p.at(TokenKind::LBrace) {
        parse_external_block(p, ext_tok.location, exported)
    } else {
        parse_external_single(p, ext_tok.location, exported)
    }
}

fn parse_external_single(p: &mut Parser, start_loc: Location, exported: bool) -> PResult<Declaration> {
    let name_tok = p.expect(TokenKind::Identifier, "a name")?;
    let name = token_name(&name_tok).expect("Identifier");
    let type_params = parse_optional_type_params(p)?;
    p.expect(TokenKind::Colon, "`:`")?;
    let type_annotation = types::parse_type_expr(p)?;
    p.expect(TokenKind::OpAssign, "`=`")?;
    let symbol_tok = p.expect(TokenKind::StringLiteral, "a symbol string")?;
    let symbol = string_value(&symbol_tok);
    let mut end_loc = symbol_tok.location;

    let from = if p.eat(TokenKind::From).is_some() {
        let from_tok = p.expect(TokenKind::StringLiteral, "a module path string")?;
        end_loc = from_tok.location.clone();
        Some(string_value(&from_tok))
    } else {
        None
    };

    let location = start_loc.merge(&end_loc);
    Ok(Declaration::ExternalDecl(ExternalDecl {
        name,
        type_annotation,
        symbol,
        from,
        exported,
        type_params,
        location,
    }))
}

fn parse_external_block(p: &mut Parser, start_loc: Location, exported: bool) -> PResult<Declaration> {
    let open = p.expect(TokenKind::LBrace, "`{`")?;
    let mut items = Vec::new();

    p.skip_extra_terminators();
    while !p.at(TokenKind::RBrace) {
        let item = if p.at(TokenKind::Opaque) {
            let opaque_tok = p.bump();
            p.expect(TokenKind::Type, "`type`")?;
            let name_tok = p.expect(TokenKind::Identifier, "a type name")?;
            let name = token_name(&name_tok).expect("Identifier");
            let type_params = parse_type_params(p)?;
            let location = opaque_tok.location.merge(&name_tok.location);
            ExternalItem::OpaqueType { name, type_params, location }
        } else {
            let name_tok = p.expect(TokenKind::Identifier, "a name")?;
            let name = token_name(&name_tok).expect("Identifier");
            p.expect(TokenKind::Colon, "`:`")?;
            let type_annotation = types::parse_type_expr(p)?;
            p.expect(TokenKind::OpAssign, "`=`")?;
            let symbol_tok = p.expect(TokenKind::StringLiteral, "a symbol string")?;
            let symbol = string_value(&symbol_tok);
            let location = name_tok.location.merge(&symbol_tok.location);
            ExternalItem::Value { name, type_annotation, symbol, location }
        };
        items.push(item);
        if p.at(TokenKind::RBrace) {
            break;
        }
        p.expect_terminator()?;
        p.skip_extra_terminators();
    }

    let close = p.expect_closing(TokenKind::RBrace, "`}`", open.location.clone())?;
    let mut end_loc = close.location;

    let from = if p.eat(TokenKind::From).is_some() {
        let from_tok = p.expect(TokenKind::StringLiteral, "a module path string")?;
        end_loc = from_tok.location.clone();
        Some(string_value(&from_tok))
    } else {
        None
    };

    let location = start_loc.merge(&end_loc);
    Ok(Declaration::ExternalBlock(ExternalBlock { from, items, exported, location }))
}

/// `import { a, b as c, type T } from "./path"` or the namespace form
/// `import * as X from "./path"`.
fn parse_import(p: &mut Parser) -> PResult<Declaration> {
    let import_tok = p.expect(TokenKind::Import, "`import`")?;

    let items = if let Some(star) = p.eat(TokenKind::OpStar) {
        p.expect(TokenKind::As, "`as`")?;
        let alias_tok = p.expect(TokenKind::Identifier, "an alias name")?;
        let alias = token_name(&alias_tok).expect("Identifier");
        let location = star.location.merge(&alias_tok.location);
        vec![ImportItem { name: "*".into(), alias: Some(alias), is_type: false, location }]
    } else {
        parse_import_item_list(p)?.0
    };

    p.expect(TokenKind::From, "`from`")?;
    let from_tok = p.expect(TokenKind::StringLiteral, "a module path string")?;
    let from = string_value(&from_tok);
    let location = import_tok.location.merge(&from_tok.location);
    Ok(Declaration::ImportDecl(ImportDecl { items, from, location }))
}

/// `{ a, b as c, type T }`. A leading `type` marks a type-only item.
fn parse_import_item_list(p: &mut Parser) -> PResult<(Vec<ImportItem>, Location)> {
    let open = p.expect(TokenKind::LBrace, "`{`")?;
    let mut items = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let is_type = p.eat(TokenKind::Type).is_some();
        let name_tok = p.bump();
        let name = token_name(&name_tok).ok_or_else(|| p.error_here("a name"))?;
        let mut location = name_tok.location;
        let alias = if p.eat(TokenKind::As).is_some() {
            let alias_tok = p.expect(TokenKind::Identifier, "an alias name")?;
            location = location.merge(&alias_tok.location);
            Some(token_name(&alias_tok).expect("Identifier"))
        } else {
            None
        };
        items.push(ImportItem { name, alias, is_type, location });
        if p.eat(TokenKind::Comma).is_none() {
            break;
        }
    }
    let close = p.expect_closing(TokenKind::RBrace, "`}`", open.location.clone())?;
    Ok((items, open.location.merge(&close.location)))
}

fn parse_reexport_items(p: &mut Parser, export_loc: Location) -> PResult<Declaration> {
    let (items, _) = parse_import_item_list(p)?;
    p.expect(TokenKind::From, "`from`")?;
    let from_tok = p.expect(TokenKind::StringLiteral, "a module path string")?;
    let from = string_value(&from_tok);
    let location = export_loc.merge(&from_tok.location);
    Ok(Declaration::ReExportDecl(ReExportDecl { items: Some(items), from, location }))
}

fn parse_reexport_star(p: &mut Parser, export_loc: Location) -> PResult<Declaration> {
    p.expect(TokenKind::OpStar, "`*`")?;
    p.expect(TokenKind::From, "`from`")?;
    let from_tok = p.expect(TokenKind::StringLiteral, "a module path string")?;
    let from = string_value(&from_tok);
    let location = export_loc.merge(&from_tok.location);
    Ok(Declaration::ReExportDecl(ReExportDecl { items: None, from, location }))
}

fn string_value(tok: &wisp_common::token::Token) -> String {
    match &tok.value {
        Some(TokenValue::Str(s)) => s.clone(),
        _ => unreachable!("caller only passes StringLiteral tokens"),
    }
}
