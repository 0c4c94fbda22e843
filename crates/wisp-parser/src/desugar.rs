//! Lowers the surface AST ([`crate::ast`]) to the core AST ([`crate::core`]).
//!
//! Four things change shape here and nowhere else:
//!
//! - `List { items }` becomes a right-folded chain of `Cons`/`Nil`
//!   applications, so later stages never need to know lists exist as
//!   syntax.
//! - Record shorthand (`{ x }`) is resolved to an explicit field value
//!   (`{ x: x }`).
//! - A multi-spread record update folds to one base plus an ordered
//!   override list (see [`crate::core::RecordOverride`]).
//! - `if` without `else` gets an implicit `()` branch at the `if`'s own
//!   location.
//!
//! Lowering a whole module can fail: a `let rec` binding that survived
//! parsing with a non-lambda value (the parser only checks the pattern
//! shape, not the value) is rejected here as a [`crate::error::ErrorKind::DesugarError`].

use crate::ast;
use crate::core::{
    CoreDeclaration, CoreExpr, CoreExternalDecl, CoreImportDecl, CoreLetDecl, CoreMatchArm,
    CoreModule, CoreReExportDecl, CoreTypeDecl, RecordOverride,
};
use crate::error::{ErrorKind, ParseError};

pub fn lower_module(module: &ast::Module) -> Result<CoreModule, ParseError> {
    let mut declarations = Vec::new();
    for decl in module.imports.iter().chain(module.declarations.iter()) {
        declarations.extend(lower_declaration(decl)?);
    }
    Ok(CoreModule { declarations, location: module.location.clone() })
}

fn lower_declaration(decl: &ast::Declaration) -> Result<Vec<CoreDeclaration>, ParseError> {
    match decl {
        ast::Declaration::LetDecl(d) => Ok(vec![CoreDeclaration::Let(lower_let_decl(d)?)]),
        ast::Declaration::TypeDecl(d) => Ok(vec![CoreDeclaration::Type(CoreTypeDecl {
            name: d.name.clone(),
            type_params: d.type_params.clone(),
            exported: d.exported,
            location: d.location.clone(),
        })]),
        ast::Declaration::ExternalDecl(d) => Ok(vec![CoreDeclaration::External(CoreExternalDecl {
            name: d.name.clone(),
            symbol: d.symbol.clone(),
            from: d.from.clone(),
            type_params: d.type_params.clone(),
            exported: d.exported,
            location: d.location.clone(),
        })]),
        ast::Declaration::ExternalBlock(block) => Ok(block
            .items
            .iter()
            .map(|item| lower_external_item(item, block.from.clone(), block.exported))
            .collect()),
        ast::Declaration::ImportDecl(d) => Ok(vec![CoreDeclaration::Import(CoreImportDecl {
            items: d.items.clone(),
            from: d.from.clone(),
            location: d.location.clone(),
        })]),
        ast::Declaration::ReExportDecl(d) => Ok(vec![CoreDeclaration::ReExport(CoreReExportDecl {
            items: d.items.clone(),
            from: d.from.clone(),
            location: d.location.clone(),
        })]),
    }
}

/// The parser already rejects a `let rec` pattern that isn't a plain
/// variable; this is the second half of that invariant, re-checked here on
/// the lowered value since a recursive binding with no function to
/// recurse through would simply never terminate.
fn lower_let_decl(d: &ast::LetDecl) -> Result<CoreLetDecl, ParseError> {
    let value = lower_expr(&d.value);
    if d.recursive && !matches!(value, CoreExpr::Lambda { .. }) {
        return Err(ParseError::new(
            ErrorKind::DesugarError("`let rec` requires its value to be a function".into()),
            d.location.clone(),
        ));
    }
    Ok(CoreLetDecl {
        pattern: d.pattern.clone(),
        value,
        mutable: d.mutable,
        recursive: d.recursive,
        exported: d.exported,
        location: d.location.clone(),
    })
}

/// An `opaque type` entry has no runtime value, only a name a later type
/// checker would resolve; it lowers to a plain (unexported) type
/// declaration with no definition of its own, same as any other type name
/// introduced outside this module. A `Value` entry inherits the enclosing
/// block's `from`/`exported`, since those are properties of the block, not
/// of any one item inside it.
fn lower_external_item(item: &ast::ExternalItem, from: Option<String>, exported: bool) -> CoreDeclaration {
    match item {
        ast::ExternalItem::Value { name, symbol, location, .. } => {
            CoreDeclaration::External(CoreExternalDecl {
                name: name.clone(),
                symbol: symbol.clone(),
                from,
                type_params: None,
                exported,
                location: location.clone(),
            })
        }
        ast::ExternalItem::OpaqueType { name, type_params, location } => {
            CoreDeclaration::Type(CoreTypeDecl {
                name: name.clone(),
                type_params: type_params.clone(),
                exported: false,
                location: location.clone(),
            })
        }
    }
}

pub fn lower_expr(expr: &ast::Expr) -> CoreExpr {
    match expr {
        ast::Expr::IntLit { value, location } => CoreExpr::IntLit { value: *value, location: location.clone() },
        ast::Expr::FloatLit { value, location } => CoreExpr::FloatLit { value: *value, location: location.clone() },
        ast::Expr::StringLit { value, location } => CoreExpr::StringLit { value: value.clone(), location: location.clone() },
        ast::Expr::BoolLit { value, location } => CoreExpr::BoolLit { value: *value, location: location.clone() },
        ast::Expr::UnitLit { location } => CoreExpr::UnitLit { location: location.clone() },
        ast::Expr::Var { name, location } => CoreExpr::Var { name: name.clone(), location: location.clone() },
        ast::Expr::Lambda { params, body, location } => CoreExpr::Lambda {
            params: params.clone(),
            body: Box::new(lower_expr(body)),
            location: location.clone(),
        },
        ast::Expr::App { func, args, location } => CoreExpr::App {
            func: Box::new(lower_expr(func)),
            args: args.iter().map(lower_expr).collect(),
            location: location.clone(),
        },
        ast::Expr::BinOp { op, lhs, rhs, location } => CoreExpr::BinOp {
            op: *op,
            lhs: Box::new(lower_expr(lhs)),
            rhs: Box::new(lower_expr(rhs)),
            location: location.clone(),
        },
        ast::Expr::UnaryOp { op, operand, location } => CoreExpr::UnaryOp {
            op: *op,
            operand: Box::new(lower_expr(operand)),
            location: location.clone(),
        },
        // `x |> f` is application with the argument first: `f(x)`.
        ast::Expr::Pipe { lhs, rhs, location } => CoreExpr::App {
            func: Box::new(lower_expr(rhs)),
            args: vec![lower_expr(lhs)],
            location: location.clone(),
        },
        ast::Expr::If { cond, then_branch, else_branch, location } => CoreExpr::If {
            cond: Box::new(lower_expr(cond)),
            then_branch: Box::new(lower_expr(then_branch)),
            else_branch: Box::new(match else_branch {
                Some(e) => lower_expr(e),
                None => CoreExpr::UnitLit { location: location.clone() },
            }),
            location: location.clone(),
        },
        ast::Expr::Match { scrutinee, arms, location } => CoreExpr::Match {
            scrutinee: Box::new(lower_expr(scrutinee)),
            arms: arms.iter().map(lower_match_arm).collect(),
            location: location.clone(),
        },
        ast::Expr::Record { fields, location } => {
            CoreExpr::Record { fields: fields.iter().map(lower_record_field).collect(), location: location.clone() }
        }
        ast::Expr::RecordUpdate { base, fields, location } => lower_record_update(base, fields, location),
        ast::Expr::RecordAccess { base, field, location } => CoreExpr::RecordAccess {
            base: Box::new(lower_expr(base)),
            field: field.clone(),
            location: location.clone(),
        },
        ast::Expr::List { items, location } => lower_list(items, location),
        ast::Expr::Tuple { items, location } => {
            CoreExpr::Tuple { items: items.iter().map(lower_expr).collect(), location: location.clone() }
        }
        ast::Expr::Block { statements, location } => {
            CoreExpr::Block { statements: statements.iter().map(lower_expr).collect(), location: location.clone() }
        }
        ast::Expr::Unsafe { body, location } => {
            CoreExpr::Unsafe { body: Box::new(lower_expr(body)), location: location.clone() }
        }
        // A type annotation exists to guide a later type checker; once
        // desugared, the expression underneath is all that remains.
        ast::Expr::TypeAnnotation { expr, .. } => lower_expr(expr),
    }
}

/// Right-folds `[a, b, c]` into `Cons(a, Cons(b, Cons(c, Nil)))`.
fn lower_list(items: &[ast::Expr], location: &ast::Location) -> CoreExpr {
    items.iter().rev().fold(CoreExpr::nil(location.clone()), |tail, item| {
        CoreExpr::cons(lower_expr(item), tail, location.clone())
    })
}

fn lower_record_field(field: &ast::RecordField) -> (String, CoreExpr) {
    let value = match &field.value {
        Some(v) => lower_expr(v),
        None => CoreExpr::Var { name: field.name.clone(), location: field.location.clone() },
    };
    (field.name.clone(), value)
}

fn lower_record_update(base: &ast::Expr, fields: &[ast::RecordField], location: &ast::Location) -> CoreExpr {
    let overrides = fields
        .iter()
        .map(|f| {
            if f.is_spread {
                let value = lower_expr(f.value.as_ref().expect("spread field always carries a value"));
                RecordOverride::Spread { value }
            } else {
                let value = match &f.value {
                    Some(v) => lower_expr(v),
                    None => CoreExpr::Var { name: f.name.clone(), location: f.location.clone() },
                };
                RecordOverride::Field { name: f.name.clone(), value }
            }
        })
        .collect();
    CoreExpr::RecordUpdate { base: Box::new(lower_expr(base)), overrides, location: location.clone() }
}

fn lower_match_arm(arm: &ast::MatchArm) -> CoreMatchArm {
    CoreMatchArm {
        pattern: arm.pattern.clone(),
        guard: arm.guard.as_ref().map(lower_expr),
        body: lower_expr(&arm.body),
        location: arm.location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Pattern;
    use wisp_common::span::{LineIndex, Span};
    use std::rc::Rc;

    fn loc(start: u32, end: u32) -> ast::Location {
        let idx = LineIndex::new("0123456789012345678901234567890");
        ast::Location::new(Rc::from("t.wisp"), Span::new(start, end), &idx)
    }

    #[test]
    fn empty_list_lowers_to_nil() {
        let lowered = lower_list(&[], &loc(0, 2));
        assert_eq!(lowered, CoreExpr::nil(loc(0, 2)));
    }

    #[test]
    fn list_lowers_to_right_folded_cons() {
        let items = vec![
            ast::Expr::IntLit { value: 1, location: loc(1, 2) },
            ast::Expr::IntLit { value: 2, location: loc(4, 5) },
        ];
        let lowered = lower_list(&items, &loc(0, 6));
        let expected = CoreExpr::cons(
            CoreExpr::IntLit { value: 1, location: loc(1, 2) },
            CoreExpr::cons(CoreExpr::IntLit { value: 2, location: loc(4, 5) }, CoreExpr::nil(loc(0, 6)), loc(0, 6)),
            loc(0, 6),
        );
        assert_eq!(lowered, expected);
    }

    #[test]
    fn record_shorthand_resolves_to_var() {
        let field = ast::RecordField { name: "x".into(), value: None, is_spread: false, location: loc(0, 1) };
        let (name, value) = lower_record_field(&field);
        assert_eq!(name, "x");
        assert_eq!(value, CoreExpr::Var { name: "x".into(), location: loc(0, 1) });
    }

    #[test]
    fn if_without_else_gets_implicit_unit() {
        let expr = ast::Expr::If {
            cond: Box::new(ast::Expr::BoolLit { value: true, location: loc(0, 4) }),
            then_branch: Box::new(ast::Expr::IntLit { value: 1, location: loc(10, 11) }),
            else_branch: None,
            location: loc(0, 11),
        };
        let CoreExpr::If { else_branch, .. } = lower_expr(&expr) else { panic!("expected If") };
        assert_eq!(*else_branch, CoreExpr::UnitLit { location: loc(0, 11) });
    }

    #[test]
    fn pipe_lowers_to_reversed_application() {
        let expr = ast::Expr::Pipe {
            lhs: Box::new(ast::Expr::Var { name: "x".into(), location: loc(0, 1) }),
            rhs: Box::new(ast::Expr::Var { name: "f".into(), location: loc(5, 6) }),
            location: loc(0, 6),
        };
        let CoreExpr::App { func, args, .. } = lower_expr(&expr) else { panic!("expected App") };
        assert_eq!(*func, CoreExpr::Var { name: "f".into(), location: loc(5, 6) });
        assert_eq!(args, vec![CoreExpr::Var { name: "x".into(), location: loc(0, 1) }]);
    }

    #[test]
    fn multi_arg_app_keeps_a_single_flat_args_list() {
        let expr = ast::Expr::App {
            func: Box::new(ast::Expr::Var { name: "f".into(), location: loc(0, 1) }),
            args: vec![
                ast::Expr::IntLit { value: 1, location: loc(2, 3) },
                ast::Expr::IntLit { value: 2, location: loc(5, 6) },
            ],
            location: loc(0, 7),
        };
        let CoreExpr::App { args, .. } = lower_expr(&expr) else { panic!("expected App") };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn multi_spread_record_update_folds_to_ordered_overrides() {
        let expr = ast::Expr::RecordUpdate {
            base: Box::new(ast::Expr::Var { name: "a".into(), location: loc(0, 1) }),
            fields: vec![
                ast::RecordField { name: "x".into(), value: Some(ast::Expr::IntLit { value: 1, location: loc(2, 3) }), is_spread: false, location: loc(2, 3) },
                ast::RecordField { name: String::new(), value: Some(ast::Expr::Var { name: "b".into(), location: loc(4, 5) }), is_spread: true, location: loc(4, 5) },
            ],
            location: loc(0, 6),
        };
        let CoreExpr::RecordUpdate { base, overrides, .. } = lower_expr(&expr) else { panic!("expected RecordUpdate") };
        assert_eq!(*base, CoreExpr::Var { name: "a".into(), location: loc(0, 1) });
        assert_eq!(overrides.len(), 2);
        assert!(matches!(overrides[0], RecordOverride::Field { .. }));
        assert!(matches!(overrides[1], RecordOverride::Spread { .. }));
    }

    #[test]
    fn type_annotation_is_transparent() {
        let expr = ast::Expr::TypeAnnotation {
            expr: Box::new(ast::Expr::IntLit { value: 1, location: loc(0, 1) }),
            type_expr: ast::TypeExpr::Var { name: "Int".into(), location: loc(4, 7) },
            location: loc(0, 7),
        };
        assert_eq!(lower_expr(&expr), CoreExpr::IntLit { value: 1, location: loc(0, 1) });
    }

    #[test]
    fn let_rec_with_lambda_value_lowers_cleanly() {
        let decl = ast::LetDecl {
            pattern: Pattern::Var { name: "f".into(), location: loc(4, 5) },
            type_annotation: None,
            value: ast::Expr::Lambda {
                params: vec![Pattern::Var { name: "x".into(), location: loc(6, 7) }],
                body: Box::new(ast::Expr::Var { name: "x".into(), location: loc(11, 12) }),
                location: loc(6, 12),
            },
            mutable: false,
            recursive: true,
            exported: false,
            location: loc(0, 12),
        };
        assert!(lower_let_decl(&decl).is_ok());
    }

    #[test]
    fn let_rec_with_non_lambda_value_is_a_desugar_error() {
        let decl = ast::LetDecl {
            pattern: Pattern::Var { name: "f".into(), location: loc(4, 5) },
            type_annotation: None,
            value: ast::Expr::IntLit { value: 1, location: loc(6, 7) },
            mutable: false,
            recursive: true,
            exported: false,
            location: loc(0, 7),
        };
        let err = lower_let_decl(&decl).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DesugarError(_)));
    }
}
