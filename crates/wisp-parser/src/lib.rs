//! Wisp parser: recursive-descent parser and desugarer.
//!
//! This crate turns the token stream from `wisp-lexer` directly into a
//! surface AST ([`ast`]), then lowers that AST into a smaller core form
//! ([`core`]) that later compiler stages consume. There is no concrete
//! syntax tree in between: each parse function builds the AST node it
//! recognizes as it goes.

pub mod ast;
pub mod core;
pub mod desugar;
pub mod error;
mod parser;

use std::rc::Rc;

pub use error::ParseError;

use parser::Parser;

/// Parse a full module: the entry point for a `.wisp` source file.
pub fn parse_module(source: &str, file: impl Into<Rc<str>>) -> Result<ast::Module, ParseError> {
    let mut p = Parser::new(file, source);
    parser::declarations::parse_module(&mut p)
}

/// Parse a single expression, e.g. for a REPL or test fixture.
pub fn parse_expression(source: &str, file: impl Into<Rc<str>>) -> Result<ast::Expr, ParseError> {
    let mut p = Parser::new(file, source);
    parser::expressions::parse_expr(&mut p)
}

/// Parse a single pattern.
pub fn parse_pattern(source: &str, file: impl Into<Rc<str>>) -> Result<ast::Pattern, ParseError> {
    let mut p = Parser::new(file, source);
    parser::patterns::parse_pattern(&mut p)
}

/// Parse a single type expression.
pub fn parse_type_expr(source: &str, file: impl Into<Rc<str>>) -> Result<ast::TypeExpr, ParseError> {
    let mut p = Parser::new(file, source);
    parser::types::parse_type_expr(&mut p)
}

/// Parse and desugar a full module in one step.
pub fn lower_module(source: &str, file: impl Into<Rc<str>>) -> Result<core::CoreModule, ParseError> {
    let module = parse_module(source, file)?;
    desugar::lower_module(&module)
}
