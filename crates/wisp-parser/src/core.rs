//! The core AST: the desugared form every later compiler stage consumes.
//!
//! Lists are lowered to `Cons`/`Nil` constructor applications, record
//! shorthand is resolved to explicit field values, `if` without `else` is
//! materialized with an implicit unit branch, and multi-spread record
//! updates are folded into a single base plus field overrides.

use serde::Serialize;

pub use crate::ast::{BinOpKind, LiteralPattern, Pattern, UnaryOpKind};
pub use wisp_common::span::Location;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreModule {
    pub declarations: Vec<CoreDeclaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum CoreDeclaration {
    Let(CoreLetDecl),
    Type(CoreTypeDecl),
    External(CoreExternalDecl),
    Import(CoreImportDecl),
    ReExport(CoreReExportDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreLetDecl {
    pub pattern: Pattern,
    pub value: CoreExpr,
    pub mutable: bool,
    pub recursive: bool,
    pub exported: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreTypeDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub exported: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreExternalDecl {
    pub name: String,
    pub symbol: String,
    pub from: Option<String>,
    pub type_params: Option<Vec<String>>,
    pub exported: bool,
    pub location: Location,
}

pub use crate::ast::ImportItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreImportDecl {
    pub items: Vec<ImportItem>,
    pub from: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreReExportDecl {
    pub items: Option<Vec<ImportItem>>,
    pub from: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum CoreExpr {
    IntLit { value: i64, location: Location },
    FloatLit { value: f64, location: Location },
    StringLit { value: String, location: Location },
    BoolLit { value: bool, location: Location },
    UnitLit { location: Location },
    Var { name: String, location: Location },
    Lambda { params: Vec<Pattern>, body: Box<CoreExpr>, location: Location },
    App { func: Box<CoreExpr>, args: Vec<CoreExpr>, location: Location },
    BinOp { op: BinOpKind, lhs: Box<CoreExpr>, rhs: Box<CoreExpr>, location: Location },
    UnaryOp { op: UnaryOpKind, operand: Box<CoreExpr>, location: Location },
    /// `else_branch` is never absent in the core AST: a missing surface
    /// `else` is lowered to an implicit `UnitLit` at the `if`'s location.
    If { cond: Box<CoreExpr>, then_branch: Box<CoreExpr>, else_branch: Box<CoreExpr>, location: Location },
    Match { scrutinee: Box<CoreExpr>, arms: Vec<CoreMatchArm>, location: Location },
    /// Shorthand has already been resolved: every field carries an
    /// explicit value expression.
    Record { fields: Vec<(String, CoreExpr)>, location: Location },
    /// A multi-spread record update (`{ ...a, x: 1, ...b, y: 2 }`) folds
    /// down to one base plus a single ordered list of overrides: applying
    /// them left to right against `base` reproduces the surface update
    /// exactly, with no need to know `a` or `b`'s field sets statically.
    RecordUpdate { base: Box<CoreExpr>, overrides: Vec<RecordOverride>, location: Location },
    RecordAccess { base: Box<CoreExpr>, field: String, location: Location },
    Tuple { items: Vec<CoreExpr>, location: Location },
    Block { statements: Vec<CoreExpr>, location: Location },
    Unsafe { body: Box<CoreExpr>, location: Location },
}

impl CoreExpr {
    pub fn location(&self) -> &Location {
        match self {
            CoreExpr::IntLit { location, .. }
            | CoreExpr::FloatLit { location, .. }
            | CoreExpr::StringLit { location, .. }
            | CoreExpr::BoolLit { location, .. }
            | CoreExpr::UnitLit { location }
            | CoreExpr::Var { location, .. }
            | CoreExpr::Lambda { location, .. }
            | CoreExpr::App { location, .. }
            | CoreExpr::BinOp { location, .. }
            | CoreExpr::UnaryOp { location, .. }
            | CoreExpr::If { location, .. }
            | CoreExpr::Match { location, .. }
            | CoreExpr::Record { location, .. }
            | CoreExpr::RecordUpdate { location, .. }
            | CoreExpr::RecordAccess { location, .. }
            | CoreExpr::Tuple { location, .. }
            | CoreExpr::Block { location, .. }
            | CoreExpr::Unsafe { location, .. } => location,
        }
    }

    /// Build the two-argument call `Cons(head, tail)` at `location`.
    pub fn cons(head: CoreExpr, tail: CoreExpr, location: Location) -> CoreExpr {
        CoreExpr::App {
            func: Box::new(CoreExpr::Var { name: "Cons".into(), location: location.clone() }),
            args: vec![head, tail],
            location,
        }
    }

    /// The empty-list constructor `Nil` at `location`.
    pub fn nil(location: Location) -> CoreExpr {
        CoreExpr::Var { name: "Nil".into(), location }
    }
}

/// One step of a [`CoreExpr::RecordUpdate`]'s override list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum RecordOverride {
    Field { name: String, value: CoreExpr },
    Spread { value: CoreExpr },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreMatchArm {
    pub pattern: Pattern,
    pub guard: Option<CoreExpr>,
    pub body: CoreExpr,
    pub location: Location,
}
