//! The surface AST: what the parser produces directly from a token stream,
//! before desugaring. Every node owns its subtrees and carries a
//! [`Location`]; there is no lossless concrete syntax tree underneath it.

use serde::Serialize;
pub use wisp_common::span::Location;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub imports: Vec<Declaration>,
    pub declarations: Vec<Declaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    LetDecl(LetDecl),
    TypeDecl(TypeDecl),
    ExternalDecl(ExternalDecl),
    ExternalBlock(ExternalBlock),
    ImportDecl(ImportDecl),
    ReExportDecl(ReExportDecl),
}

impl Declaration {
    pub fn location(&self) -> &Location {
        match self {
            Declaration::LetDecl(d) => &d.location,
            Declaration::TypeDecl(d) => &d.location,
            Declaration::ExternalDecl(d) => &d.location,
            Declaration::ExternalBlock(d) => &d.location,
            Declaration::ImportDecl(d) => &d.location,
            Declaration::ReExportDecl(d) => &d.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetDecl {
    pub pattern: Pattern,
    pub type_annotation: Option<TypeExpr>,
    pub value: Expr,
    pub mutable: bool,
    /// `let rec`. When set, `value` is always an `Expr::Lambda`: a
    /// recursive binding with no function value would never terminate.
    pub recursive: bool,
    pub exported: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub definition: TypeDefinition,
    pub exported: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TypeDefinition {
    Alias(TypeExpr),
    Variant(Vec<VariantCase>),
    Record(Vec<RecordFieldType>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantCase {
    pub name: String,
    pub fields: Vec<TypeExpr>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFieldType {
    pub name: String,
    pub type_expr: TypeExpr,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalDecl {
    pub name: String,
    pub type_annotation: TypeExpr,
    pub symbol: String,
    pub from: Option<String>,
    pub exported: bool,
    pub type_params: Option<Vec<String>>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalBlock {
    pub from: Option<String>,
    pub items: Vec<ExternalItem>,
    pub exported: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ExternalItem {
    Value { name: String, type_annotation: TypeExpr, symbol: String, location: Location },
    /// An `opaque type Name` entry whose representation is defined outside
    /// this module; `Type` is the sentinel type constructor for its uses.
    OpaqueType { name: String, type_params: Vec<String>, location: Location },
}

/// One entry of an `import { ... } from "..."` item list.
///
/// The namespace form `import * as X from "./path"` is represented as a
/// single item named `"*"` with `alias: Some("X")`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
    pub is_type: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDecl {
    pub items: Vec<ImportItem>,
    pub from: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReExportDecl {
    /// `None` is the namespace form, `export * from "./mod"`.
    pub items: Option<Vec<ImportItem>>,
    pub from: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOpKind {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Cons,
    Concat,
    Compose,
    ComposeRev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOpKind {
    Neg,
    Not,
    /// Postfix `!`, parsed at the same precedence level as `.field` access
    /// and call; reuses `UnaryOp` rather than a dedicated `Expr` variant,
    /// since the surface AST's `Expr` set fixes the full variant list.
    Deref,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    IntLit { value: i64, location: Location },
    FloatLit { value: f64, location: Location },
    StringLit { value: String, location: Location },
    BoolLit { value: bool, location: Location },
    UnitLit { location: Location },
    Var { name: String, location: Location },
    Lambda { params: Vec<Pattern>, body: Box<Expr>, location: Location },
    App { func: Box<Expr>, args: Vec<Expr>, location: Location },
    BinOp { op: BinOpKind, lhs: Box<Expr>, rhs: Box<Expr>, location: Location },
    UnaryOp { op: UnaryOpKind, operand: Box<Expr>, location: Location },
    Pipe { lhs: Box<Expr>, rhs: Box<Expr>, location: Location },
    If { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Option<Box<Expr>>, location: Location },
    Match { scrutinee: Box<Expr>, arms: Vec<MatchArm>, location: Location },
    Record { fields: Vec<RecordField>, location: Location },
    RecordUpdate { base: Box<Expr>, fields: Vec<RecordField>, location: Location },
    RecordAccess { base: Box<Expr>, field: String, location: Location },
    List { items: Vec<Expr>, location: Location },
    Tuple { items: Vec<Expr>, location: Location },
    Block { statements: Vec<Expr>, location: Location },
    Unsafe { body: Box<Expr>, location: Location },
    TypeAnnotation { expr: Box<Expr>, type_expr: TypeExpr, location: Location },
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::IntLit { location, .. }
            | Expr::FloatLit { location, .. }
            | Expr::StringLit { location, .. }
            | Expr::BoolLit { location, .. }
            | Expr::UnitLit { location }
            | Expr::Var { location, .. }
            | Expr::Lambda { location, .. }
            | Expr::App { location, .. }
            | Expr::BinOp { location, .. }
            | Expr::UnaryOp { location, .. }
            | Expr::Pipe { location, .. }
            | Expr::If { location, .. }
            | Expr::Match { location, .. }
            | Expr::Record { location, .. }
            | Expr::RecordUpdate { location, .. }
            | Expr::RecordAccess { location, .. }
            | Expr::List { location, .. }
            | Expr::Tuple { location, .. }
            | Expr::Block { location, .. }
            | Expr::Unsafe { location, .. }
            | Expr::TypeAnnotation { location, .. } => location,
        }
    }
}

/// A record field in a literal, update, or shorthand position.
///
/// `{ x }` (shorthand) parses with `value: None`, meaning "use the
/// in-scope binding named `x`"; the desugarer replaces it with an explicit
/// `Var { name: "x" }` before anything downstream of the surface AST needs
/// to understand shorthand at all.
///
/// A `...base` spread past the first one inside a record-update literal
/// (`{ ...a, ...b, x: 1 }`) is represented as a field with `is_spread: true`
/// and an empty `name`; `value` holds the spread expression. See
/// [`crate::desugar`] for how multiple spreads fold into one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: Option<Expr>,
    pub is_spread: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Pattern {
    Wildcard { location: Location },
    Var { name: String, location: Location },
    Literal { value: LiteralPattern, location: Location },
    Constructor { name: String, args: Vec<Pattern>, location: Location },
    Record { fields: Vec<FieldPattern>, has_rest: bool, location: Location },
    List { items: Vec<Pattern>, rest: Option<Box<Pattern>>, location: Location },
    Tuple { items: Vec<Pattern>, location: Location },
}

impl Pattern {
    pub fn location(&self) -> &Location {
        match self {
            Pattern::Wildcard { location }
            | Pattern::Var { location, .. }
            | Pattern::Literal { location, .. }
            | Pattern::Constructor { location, .. }
            | Pattern::Record { location, .. }
            | Pattern::List { location, .. }
            | Pattern::Tuple { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPattern {
    pub name: String,
    /// `None` is shorthand: `{ x }` destructures the field `x` into a
    /// binding named `x`.
    pub pattern: Option<Pattern>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum LiteralPattern {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TypeExpr {
    /// An uppercase-leading bare name: `Int`, `String`, `Option` with no
    /// argument list.
    Const { name: String, location: Location },
    /// A lowercase-leading bare name: a type variable (`a`, `t`).
    Var { name: String, location: Location },
    /// `Const '<' TypeList '>'`: a generic application, e.g. `Option<T>`.
    App { constructor: String, args: Vec<TypeExpr>, location: Location },
    Fn { param: Box<TypeExpr>, ret: Box<TypeExpr>, location: Location },
    Record { fields: Vec<RecordFieldType>, location: Location },
    Tuple { items: Vec<TypeExpr>, location: Location },
    /// The `Type` sentinel recognized inside `external` blocks, naming an
    /// opaque type with no visible representation.
    Opaque { location: Location },
}

impl TypeExpr {
    pub fn location(&self) -> &Location {
        match self {
            TypeExpr::Const { location, .. }
            | TypeExpr::Var { location, .. }
            | TypeExpr::App { location, .. }
            | TypeExpr::Fn { location, .. }
            | TypeExpr::Record { location, .. }
            | TypeExpr::Tuple { location, .. }
            | TypeExpr::Opaque { location } => location,
        }
    }
}
