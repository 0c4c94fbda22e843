use wisp_common::token::{TokenKind, TokenValue};
use wisp_lexer::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn let_binding_with_lambda_arrow() {
    // let add = x => x + x
    let kinds = kinds("let add = x => x + x");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::OpAssign,
            TokenKind::Identifier,
            TokenKind::FatArrow,
            TokenKind::Identifier,
            TokenKind::OpPlus,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn reference_assignment_operator_is_distinct_from_declaration_assign() {
    let kinds = kinds("ref := 1");
    assert_eq!(
        kinds,
        vec![TokenKind::Identifier, TokenKind::RefAssign, TokenKind::IntLiteral, TokenKind::Eof]
    );
}

#[test]
fn pipeline_and_composition_operators_are_distinct() {
    let kinds = kinds("a |> b >> c << d");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::OpPipeGt,
            TokenKind::Identifier,
            TokenKind::OpGtGt,
            TokenKind::Identifier,
            TokenKind::OpLtLt,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn cons_and_concat_operators_are_distinct() {
    let kinds = kinds("x :: xs & \"tail\"");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::OpCons,
            TokenKind::Identifier,
            TokenKind::OpAmpersand,
            TokenKind::StringLiteral,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn multiline_let_sequence_gets_semicolons_inserted() {
    let source = "let x = 1\nlet y = 2\nx + y";
    let kinds = kinds(source);
    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::OpAssign,
            TokenKind::IntLiteral,
            TokenKind::Semicolon,
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::OpAssign,
            TokenKind::IntLiteral,
            TokenKind::Semicolon,
            TokenKind::Identifier,
            TokenKind::OpPlus,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn pipe_continuation_suppresses_asi() {
    // a newline followed by a leading `|>` continues the previous expression
    let kinds = kinds("x\n|> f");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::OpPipeGt,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn match_arm_leading_pipe_does_not_terminate_previous_arm() {
    let source = "match x {\n| A -> 1\n| B -> 2\n}";
    let tokens = Lexer::tokenize(source);
    // no Semicolon should appear directly before a leading `|`
    for w in tokens.windows(2) {
        if w[1].kind == TokenKind::Pipe {
            assert_ne!(w[0].kind, TokenKind::Semicolon);
        }
    }
}

#[test]
fn string_literal_decodes_escapes_and_keeps_unicode_verbatim() {
    let tokens = Lexer::tokenize(r#""héllo\nwörld""#);
    assert_eq!(tokens[0].value, Some(TokenValue::Str("héllo\nwörld".into())));
}

#[test]
fn fifty_thousand_codepoint_string_round_trips() {
    let body: String = std::iter::repeat('a').take(50_000).collect();
    let source = format!("\"{body}\"");
    let tokens = Lexer::tokenize(&source);
    match &tokens[0].value {
        Some(TokenValue::Str(s)) => assert_eq!(s.chars().count(), 50_000),
        other => panic!("expected decoded string, got {other:?}"),
    }
}

#[test]
fn boundary_integer_and_float_literals() {
    assert_eq!(Lexer::tokenize("9223372036854775807")[0].value, Some(TokenValue::Int(i64::MAX)));
    assert_eq!(Lexer::tokenize("0.0")[0].value, Some(TokenValue::Float(0.0)));
}

#[test]
fn unnormalized_unicode_identifiers_are_preserved_distinctly() {
    // "é" as a single precomposed codepoint vs "e" + combining acute accent
    let precomposed = "caf\u{00E9}";
    let combining = "cafe\u{0301}";
    let a = &Lexer::tokenize(precomposed)[0];
    let b = &Lexer::tokenize(combining)[0];
    assert_eq!(a.kind, TokenKind::Identifier);
    assert_eq!(b.kind, TokenKind::Identifier);
    assert_ne!(a.value, b.value, "lexer must not normalize identifiers");
}

#[test]
fn determinism_same_source_same_tokens() {
    let source = "let x = [1, 2, 3] |> sum";
    assert_eq!(Lexer::tokenize(source), Lexer::tokenize(source));
}
