//! Language-level properties

use sapling::frontend::core::lexer::{tokenize, Token, TokenKind};
use sapling::frontend::core::parser::{ParseError, StmtKind, SyntaxErrorKind};
use sapling::frontend::core::scope::ScopeId;
use sapling::frontend::core::type_system::ExType;
use sapling::middle::ir::{ConstValue, GlobalId, Instruction, Operand};
use sapling::vm::Value;
use sapling::{compile_source, run, CompileError, Compiler};

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

// =========================================================================
// 词法
// =========================================================================

#[test]
fn test_priority_then_longest_then_order() {
    // `int` is a type, not an identifier, despite both matching
    let tokens = tokenize("int integer").unwrap();
    assert_eq!(kinds(&tokens), vec![TokenKind::Type, TokenKind::Identifier]);
    assert_eq!(tokens[1].text, "integer");

    // `<=` beats `<` on length
    let tokens = tokenize("1 <= 2").unwrap();
    assert_eq!(tokens[1].text, "<=");
}

#[test]
fn test_comments_do_not_change_the_program() {
    let plain = Compiler::new().parse("int x = 1 + 2; return x;").unwrap();
    let commented = Compiler::new()
        .parse("# header\nint x = 1 #_ inline _# + 2; ###_ doc _###\nreturn x;")
        .unwrap();
    assert_eq!(plain.to_string(), commented.to_string());
}

// =========================================================================
// 语法与作用域
// =========================================================================

#[test]
fn test_property_declaration() {
    let program = Compiler::new().parse("int x = 5;").unwrap();
    assert_eq!(program.root.body.len(), 1);
    assert!(matches!(
        program.root.body[0].kind,
        StmtKind::AssignProperty { ty: ExType::Int, .. }
    ));
    assert_eq!(program.scopes.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Int));

    let module = compile_source("int x = 5;").unwrap();
    let (_, main) = module.function_by_name("main").unwrap();
    assert_eq!(
        main.blocks[0].instructions[0],
        Instruction::Store {
            ptr: Operand::Global(GlobalId(0)),
            value: Operand::Const(ConstValue::Int(5)),
        }
    );
}

#[test]
fn test_method_call_is_typed() {
    let program = Compiler::new()
        .parse("method foo = { return 1; }; int r = foo();")
        .unwrap();
    let signature = program
        .scopes
        .lookup_function_signature(ScopeId::ROOT, "foo")
        .unwrap();
    assert_eq!(signature.return_type, ExType::Int);

    match &program.root.body[1].kind {
        StmtKind::AssignProperty { expr, .. } => assert_eq!(expr.ty, ExType::Int),
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_missing_semicolon_points_at_next_token() {
    let err = Compiler::new().compile("int x = 1\nint y = 2;").unwrap_err();
    match err {
        CompileError::Parse(ParseError::Syntax(e)) => {
            assert_eq!(e.kind, SyntaxErrorKind::MissingSemicolon);
            assert_eq!(e.found, Some(TokenKind::Type));
            assert_eq!((e.span.start.line, e.span.start.column), (2, 1));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

// =========================================================================
// 求值
// =========================================================================

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(run("return 1 + 2 * 3;").unwrap().value, Value::Int(7));
}

#[test]
fn test_ternary_value() {
    let source = "int a = 5; int b = 2; int z = a > b ? 1 : 0; return z;";
    assert_eq!(run(source).unwrap().value, Value::Int(1));
}

#[test]
fn test_later_declaration_shadows() {
    assert_eq!(
        run("int x = 1; int x = 2; return x;").unwrap().value,
        Value::Int(2)
    );
}
