use wisp_parser::ast::{BinOpKind, Declaration, Expr, Pattern, TypeDefinition, TypeExpr, UnaryOpKind};
use wisp_parser::error::ErrorKind;
use wisp_parser::{lower_module, parse_expression, parse_module, parse_pattern};

fn expr(source: &str) -> Expr {
    parse_expression(source, "t.wisp").unwrap_or_else(|e| panic!("parse error: {e}"))
}

fn module(source: &str) -> Vec<Declaration> {
    parse_module(source, "t.wisp").unwrap_or_else(|e| panic!("parse error: {e}")).declarations
}

fn imports(source: &str) -> Vec<Declaration> {
    parse_module(source, "t.wisp").unwrap_or_else(|e| panic!("parse error: {e}")).imports
}

#[test]
fn call_binds_tighter_than_operators() {
    // f(x) + g(y)  ==  (f(x)) + (g(y))
    let e = expr("f(x) + g(y)");
    let Expr::BinOp { op, lhs, rhs, .. } = e else { panic!("expected BinOp") };
    assert_eq!(op, BinOpKind::Add);
    assert!(matches!(*lhs, Expr::App { .. }));
    assert!(matches!(*rhs, Expr::App { .. }));
}

#[test]
fn call_collects_every_argument_into_one_app() {
    let e = expr("f(x, y, z)");
    let Expr::App { func, args, .. } = e else { panic!("expected App") };
    assert!(matches!(*func, Expr::Var { .. }));
    assert_eq!(args.len(), 3);
}

#[test]
fn chained_calls_curry_left_associatively() {
    // f(x)(y) parses as App{func: App{func: f, args: [x]}, args: [y]}
    let e = expr("f(x)(y)");
    let Expr::App { func, args, .. } = e else { panic!("expected outer App") };
    assert_eq!(args.len(), 1);
    let Expr::App { func: inner_func, .. } = *func else { panic!("expected inner App") };
    assert!(matches!(*inner_func, Expr::Var { .. }));
}

#[test]
fn postfix_deref_chains_with_call_and_access() {
    let e = expr("cell!.value");
    let Expr::RecordAccess { base, field, .. } = e else { panic!("expected RecordAccess") };
    assert_eq!(field, "value");
    assert!(matches!(*base, Expr::UnaryOp { op: UnaryOpKind::Deref, .. }));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let e = expr("1 + 2 * 3");
    let Expr::BinOp { op: BinOpKind::Add, rhs, .. } = e else { panic!("expected outer Add") };
    assert!(matches!(*rhs, Expr::BinOp { op: BinOpKind::Mul, .. }));
}

#[test]
fn cons_is_right_associative() {
    // 1 :: 2 :: nil  ==  1 :: (2 :: nil)
    let e = expr("1 :: 2 :: nil");
    let Expr::BinOp { op: BinOpKind::Cons, lhs, rhs, .. } = e else { panic!("expected Cons") };
    assert!(matches!(*lhs, Expr::IntLit { value: 1, .. }));
    assert!(matches!(*rhs, Expr::BinOp { op: BinOpKind::Cons, .. }));
}

#[test]
fn pipe_is_left_associative() {
    // a |> f |> g  ==  (a |> f) |> g
    let e = expr("a |> f |> g");
    let Expr::Pipe { lhs, .. } = e else { panic!("expected outer Pipe") };
    assert!(matches!(*lhs, Expr::Pipe { .. }));
}

#[test]
fn bare_identifier_with_no_call_parens_is_just_a_variable() {
    // This grammar has no application by juxtaposition: `f x` is `f`
    // followed by a separate statement `x`, not a call.
    let e = expr("f");
    assert!(matches!(e, Expr::Var { .. }));
}

#[test]
fn single_bare_identifier_followed_by_fat_arrow_is_a_lambda() {
    let e = expr("x => x + 1");
    let Expr::Lambda { params, .. } = e else { panic!("expected Lambda") };
    assert_eq!(params.len(), 1);
    assert!(matches!(params[0], Pattern::Var { .. }));
}

#[test]
fn parenthesized_list_followed_by_fat_arrow_is_a_multi_param_lambda() {
    let e = expr("(x, y) => x + y");
    let Expr::Lambda { params, .. } = e else { panic!("expected Lambda") };
    assert_eq!(params.len(), 2);
}

#[test]
fn parenthesized_list_with_no_fat_arrow_is_a_tuple() {
    let e = expr("(x, y)");
    assert!(matches!(e, Expr::Tuple { .. }));
}

#[test]
fn reference_assignment_uses_colon_equals() {
    let e = expr("x := 1");
    let Expr::BinOp { op: BinOpKind::Assign, .. } = e else { panic!("expected Assign") };
}

#[test]
fn empty_braces_parse_as_empty_record_not_empty_block() {
    let e = expr("{}");
    let Expr::Record { fields, .. } = e else { panic!("expected empty Record") };
    assert!(fields.is_empty());
}

#[test]
fn brace_with_statement_sequence_is_a_block() {
    let e = expr("{ let x = 1; x + 1 }");
    assert!(matches!(e, Expr::Block { .. }));
}

#[test]
fn brace_with_field_colon_is_a_record_literal() {
    let e = expr("{ x: 1, y: 2 }");
    let Expr::Record { fields, .. } = e else { panic!("expected Record") };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "x");
}

#[test]
fn record_shorthand_field_has_no_explicit_value() {
    let e = expr("{ x, y }");
    let Expr::Record { fields, .. } = e else { panic!("expected Record") };
    assert!(fields[0].value.is_none());
}

#[test]
fn record_update_with_multiple_spreads_keeps_each_as_its_own_field() {
    let e = expr("{ ...a, x: 1, ...b }");
    let Expr::RecordUpdate { fields, .. } = e else { panic!("expected RecordUpdate") };
    assert_eq!(fields.len(), 2);
    assert!(!fields[0].is_spread);
    assert_eq!(fields[0].name, "x");
    assert!(fields[1].is_spread);
}

#[test]
fn if_without_else_has_no_else_branch_in_surface_ast() {
    let e = expr("if true then 1");
    let Expr::If { else_branch, .. } = e else { panic!("expected If") };
    assert!(else_branch.is_none());
}

#[test]
fn match_arms_all_require_leading_pipe() {
    let e = expr("match x { | Some(y) => y | None => 0 }");
    let Expr::Match { arms, .. } = e else { panic!("expected Match") };
    assert_eq!(arms.len(), 2);
}

#[test]
fn match_arm_guard_is_parsed() {
    let e = expr("match x { | y when y > 0 => y | y => 0 }");
    let Expr::Match { arms, .. } = e else { panic!("expected Match") };
    assert!(arms[0].guard.is_some());
    assert!(arms[1].guard.is_none());
}

#[test]
fn uppercase_identifier_pattern_is_a_constructor() {
    let p = parse_pattern("Some x", "t.wisp").unwrap();
    let Pattern::Constructor { name, args, .. } = p else { panic!("expected Constructor") };
    assert_eq!(name, "Some");
    assert_eq!(args.len(), 1);
}

#[test]
fn lowercase_identifier_pattern_is_a_variable() {
    let p = parse_pattern("x", "t.wisp").unwrap();
    assert!(matches!(p, Pattern::Var { .. }));
}

#[test]
fn underscore_pattern_is_wildcard() {
    let p = parse_pattern("_", "t.wisp").unwrap();
    assert!(matches!(p, Pattern::Wildcard { .. }));
}

#[test]
fn list_pattern_with_rest_binds_tail() {
    let p = parse_pattern("[a, b, ...rest]", "t.wisp").unwrap();
    let Pattern::List { items, rest, .. } = p else { panic!("expected List") };
    assert_eq!(items.len(), 2);
    assert!(rest.is_some());
}

#[test]
fn let_decl_binds_a_bare_name_pattern() {
    let decls = module("let add : Int -> Int = x => x + 1");
    assert_eq!(decls.len(), 1);
    let Declaration::LetDecl(d) = &decls[0] else { panic!("expected LetDecl") };
    assert!(matches!(d.pattern, Pattern::Var { .. }));
    assert!(d.type_annotation.is_some());
}

#[test]
fn let_decl_destructures_a_tuple_pattern() {
    let decls = module("let (a, b) = pair");
    let Declaration::LetDecl(d) = &decls[0] else { panic!("expected LetDecl") };
    assert!(matches!(d.pattern, Pattern::Tuple { .. }));
}

#[test]
fn let_decl_destructures_a_record_pattern() {
    let decls = module("let { x, y } = point");
    let Declaration::LetDecl(d) = &decls[0] else { panic!("expected LetDecl") };
    let Pattern::Record { fields, .. } = &d.pattern else { panic!("expected Record pattern") };
    assert_eq!(fields.len(), 2);
}

#[test]
fn let_rec_with_non_var_pattern_is_rejected_while_parsing() {
    let err = parse_module("let rec (a, b) = pair", "t.wisp").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidPatternInContext));
}

#[test]
fn exported_let_decl_sets_exported_flag() {
    let decls = module("export let x = 1");
    let Declaration::LetDecl(d) = &decls[0] else { panic!("expected LetDecl") };
    assert!(d.exported);
}

#[test]
fn variant_type_decl_collects_every_case() {
    let decls = module("type Option<T> =\n  | Some(T)\n  | None;");
    let Declaration::TypeDecl(d) = &decls[0] else { panic!("expected TypeDecl") };
    assert_eq!(d.type_params, vec!["T".to_string()]);
    let TypeDefinition::Variant(cases) = &d.definition else { panic!("expected Variant") };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].name, "Some");
    assert_eq!(cases[0].fields.len(), 1);
    assert!(matches!(cases[0].fields[0], TypeExpr::Var { .. }));
    assert_eq!(cases[1].fields.len(), 0);
}

#[test]
fn record_type_decl_is_not_wrapped_as_an_alias() {
    let decls = module("type Point = { x: Int, y: Int }");
    let Declaration::TypeDecl(d) = &decls[0] else { panic!("expected TypeDecl") };
    assert!(matches!(d.definition, TypeDefinition::Record(_)));
}

#[test]
fn generic_type_application_splits_nested_closing_angles() {
    let decls = module("type Nested = Option<Option<Int>>");
    let Declaration::TypeDecl(d) = &decls[0] else { panic!("expected TypeDecl") };
    let TypeDefinition::Alias(TypeExpr::App { constructor, args, .. }) = &d.definition else {
        panic!("expected generic alias")
    };
    assert_eq!(constructor, "Option");
    assert_eq!(args.len(), 1);
    assert!(matches!(args[0], TypeExpr::App { .. }));
}

#[test]
fn uppercase_bare_name_is_a_type_const_lowercase_is_a_type_var() {
    let decls = module("type Pair = (Int, a)");
    let Declaration::TypeDecl(d) = &decls[0] else { panic!("expected TypeDecl") };
    let TypeDefinition::Alias(TypeExpr::Tuple { items, .. }) = &d.definition else { panic!("expected tuple alias") };
    assert!(matches!(items[0], TypeExpr::Const { .. }));
    assert!(matches!(items[1], TypeExpr::Var { .. }));
}

#[test]
fn import_item_list_supports_aliases_and_type_items() {
    let decls = imports("import { map, filter as filt, type T } from \"./list\";");
    let Declaration::ImportDecl(d) = &decls[0] else { panic!("expected ImportDecl") };
    assert_eq!(d.from, "./list");
    assert_eq!(d.items.len(), 3);
    assert_eq!(d.items[0].name, "map");
    assert!(d.items[0].alias.is_none());
    assert_eq!(d.items[1].alias.as_deref(), Some("filt"));
    assert!(d.items[2].is_type);
}

#[test]
fn namespace_import_uses_star_as() {
    let decls = imports("import * as List from \"./list\";");
    let Declaration::ImportDecl(d) = &decls[0] else { panic!("expected ImportDecl") };
    assert_eq!(d.items.len(), 1);
    assert_eq!(d.items[0].name, "*");
    assert_eq!(d.items[0].alias.as_deref(), Some("List"));
}

#[test]
fn reexport_item_list_carries_source_module() {
    let decls = imports("export { map, type T } from \"./list\";");
    let Declaration::ReExportDecl(d) = &decls[0] else { panic!("expected ReExportDecl") };
    assert_eq!(d.from, "./list");
    assert_eq!(d.items.as_ref().unwrap().len(), 2);
}

#[test]
fn namespace_reexport_has_no_item_list() {
    let decls = imports("export * from \"./list\";");
    let Declaration::ReExportDecl(d) = &decls[0] else { panic!("expected ReExportDecl") };
    assert!(d.items.is_none());
}

#[test]
fn external_value_declaration_carries_symbol() {
    let decls = module("external sqrt : Float -> Float = \"c_sqrt\"");
    let Declaration::ExternalDecl(d) = &decls[0] else { panic!("expected ExternalDecl") };
    assert_eq!(d.symbol, "c_sqrt");
    assert!(!d.exported);
}

#[test]
fn external_declaration_accepts_from_clause_and_type_params() {
    let decls = module("external identity<T> : T -> T = \"c_identity\" from \"./native\"");
    let Declaration::ExternalDecl(d) = &decls[0] else { panic!("expected ExternalDecl") };
    assert_eq!(d.type_params.as_ref().unwrap(), &vec!["T".to_string()]);
    assert_eq!(d.from.as_deref(), Some("./native"));
}

#[test]
fn exported_external_declaration_sets_exported_flag() {
    let decls = module("export external sqrt : Float -> Float = \"c_sqrt\"");
    let Declaration::ExternalDecl(d) = &decls[0] else { panic!("expected ExternalDecl") };
    assert!(d.exported);
}

#[test]
fn external_block_mixes_values_and_opaque_types() {
    let decls = module(
        "external {\n  opaque type Handle\n  open : String -> Handle = \"c_open\"\n}",
    );
    let Declaration::ExternalBlock(b) = &decls[0] else { panic!("expected ExternalBlock") };
    assert_eq!(b.items.len(), 2);
}

#[test]
fn external_block_accepts_trailing_from_clause() {
    let decls = module("external {\n  open : String -> Int = \"c_open\"\n} from \"./native\"");
    let Declaration::ExternalBlock(b) = &decls[0] else { panic!("expected ExternalBlock") };
    assert_eq!(b.from.as_deref(), Some("./native"));
}

#[test]
fn module_with_multiple_declarations_and_no_trailing_terminator() {
    let decls = module("let a = 1\nlet b = 2");
    assert_eq!(decls.len(), 2);
}

#[test]
fn unclosed_paren_reports_unclosed_delimiter() {
    let err = parse_expression("(1, 2", "t.wisp").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnclosedDelimiter { .. }));
}

#[test]
fn unclosed_record_pattern_reports_unclosed_delimiter() {
    let err = parse_pattern("{ x, y", "t.wisp").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnclosedDelimiter { .. }));
}

#[test]
fn let_rec_with_non_lambda_value_fails_lowering() {
    let err = lower_module("let rec f = 1", "t.wisp").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DesugarError(_)));
}

#[test]
fn let_rec_with_lambda_value_lowers_successfully() {
    let core = lower_module("let rec f = x => f(x)", "t.wisp").unwrap();
    assert_eq!(core.declarations.len(), 1);
}
