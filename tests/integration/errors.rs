//! Error reporting through the public API

use sapling::frontend::core::lexer::LexError;
use sapling::frontend::core::parser::{ParseError, SyntaxErrorKind};
use sapling::frontend::core::scope::ScopeError;
use sapling::frontend::core::type_system::ExType;
use sapling::middle::codegen::CodegenError;
use sapling::{compile_source, run, CompileError, Compiler};

fn compile_error(source: &str) -> CompileError {
    Compiler::new().compile(source).unwrap_err()
}

#[test]
fn test_lex_error_position() {
    match compile_error("int x = 1;\nint y = $;") {
        CompileError::Lex(LexError::NoMatch { position, found }) => {
            assert_eq!(found, '$');
            assert_eq!((position.line, position.column), (2, 9));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_undefined_identifier() {
    match compile_error("int y = x + 1;") {
        CompileError::Parse(ParseError::Scope(ScopeError::UndefinedIdentifier { name, .. })) => {
            assert_eq!(name, "x")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_method_cannot_call_itself() {
    match compile_error("method f = { return f(); };") {
        CompileError::Parse(ParseError::Scope(ScopeError::UndefinedFunction { name, .. })) => {
            assert_eq!(name, "f")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_type_mismatch() {
    match compile_error(r#"int x = "hi";"#) {
        CompileError::Codegen(CodegenError::TypeMismatch {
            expected, found, ..
        }) => assert_eq!((expected, found), (ExType::Int, ExType::Str)),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_only_first_error_reported() {
    let err = compile_error("int b = c; int a = ;");
    assert!(matches!(
        err,
        CompileError::Parse(ParseError::Scope(ScopeError::UndefinedIdentifier { .. }))
    ));
}

#[test]
fn test_unexpected_eof() {
    let err = compile_error("int x =");
    match err {
        CompileError::Parse(e) => assert_eq!(e.syntax_kind(), Some(SyntaxErrorKind::UnexpectedEof)),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_anyhow_context() {
    let err = compile_source("int x = 1").unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.starts_with("Compilation failed: Parse error: Missing semicolon"));

    let err = compile_source("int x = y;").unwrap_err();
    let message = format!("{:#}", err);
    assert_eq!(
        message,
        "Compilation failed: Parse error: Undefined identifier `y` at [1:9 - 1:10]"
    );

    let err = run("return 1 / 0;").unwrap_err();
    assert!(format!("{:#}", err).contains("Division by zero"));
}

#[test]
fn test_class_name_used_as_value() {
    let err = run("class C = { int x = 1; }; bool b = C == C; return b;").unwrap_err();
    assert!(format!("{:#}", err).contains("`C` names a class, not a value"));

    match compile_error("class C = { int x = 1; }; println(C);") {
        CompileError::Parse(ParseError::Scope(ScopeError::NotAValue { name, ty, .. })) => {
            assert_eq!((name.as_str(), ty), ("C", ExType::Class))
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_nested_block_comment_is_skipped() {
    let outcome = run("#_ outer #_ inner _# still _# int x = 1; return x;").unwrap();
    assert_eq!(outcome.value, sapling::vm::Value::Int(1));
}
