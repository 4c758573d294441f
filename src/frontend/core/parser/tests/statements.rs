//! Statement parsing tests

use super::{parse_ok, parse_source, root_scopes};
use crate::frontend::core::lexer::tokenize;
use crate::frontend::core::parser::{parse, ExprKind, LiteralKind, ParseError, StmtKind};
use crate::frontend::core::scope::{ScopeError, ScopeId, ScopeOwner};
use crate::frontend::core::type_system::ExType;

// =========================================================================
// 属性赋值
// =========================================================================

#[test]
fn test_assign_property() {
    let program = parse_ok("int x = 5;");
    assert_eq!(program.root.body.len(), 1);

    let stmt = &program.root.body[0];
    assert_eq!(stmt.scope, ScopeId::ROOT);
    assert_eq!(stmt.span.start.offset, 0);
    assert_eq!(stmt.span.end.offset, 10);

    let StmtKind::AssignProperty {
        ty,
        identifier,
        expr,
    } = &stmt.kind
    else {
        panic!("expected a property assignment, got {:?}", stmt.kind);
    };
    assert_eq!(*ty, ExType::Int);
    assert_eq!(identifier.value, "x");
    assert_eq!(identifier.span.start.offset, 4);
    assert_eq!(expr.ty, ExType::Int);
    assert!(matches!(
        &expr.kind,
        ExprKind::Literal { kind: LiteralKind::Integer, raw } if raw == "5"
    ));

    assert_eq!(program.scopes.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Int));
}

#[test]
fn test_assign_every_literal_type() {
    let program = parse_ok(
        r#"int i = 1; float f = 1.5; str s = "hi"; char c = 'a'; bool b = False;"#,
    );
    let types: Vec<ExType> = program
        .root
        .body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::AssignProperty { expr, .. } => expr.ty,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();
    assert_eq!(
        types,
        vec![ExType::Int, ExType::Float, ExType::Str, ExType::Char, ExType::Bool]
    );
}

#[test]
fn test_redeclaration_last_write_wins() {
    let program = parse_ok("int x = 1; float x = 2.0; float y = x;");
    assert_eq!(program.scopes.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Float));
}

#[test]
fn test_strict_redeclaration() {
    let tokens = tokenize("int x = 1; int x = 2;").unwrap();
    let scopes = root_scopes().with_strict_redeclaration(true);

    let err = parse(&tokens, scopes).unwrap_err();
    match err {
        ParseError::Scope(ScopeError::Redeclaration { name, span }) => {
            assert_eq!(name, "x");
            assert_eq!(span.start.offset, 15);
        }
        other => panic!("expected a redeclaration error, got {:?}", other),
    }
}

// =========================================================================
// 方法赋值
// =========================================================================

#[test]
fn test_assign_method() {
    let program = parse_ok("method foo = { return 1; };");

    let StmtKind::AssignMethod { identifier, method } = &program.root.body[0].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(identifier.value, "foo");
    assert_eq!(method.name, "foo");
    assert_eq!(method.return_type, ExType::Int);
    assert_eq!(method.body.len(), 1);
    assert_ne!(method.scope, ScopeId::ROOT);
    assert_eq!(program.scopes.parent(method.scope), Some(ScopeId::ROOT));
    assert_eq!(
        program.scopes.owner(method.scope),
        &ScopeOwner::Method("foo".to_string())
    );

    let signature = program
        .scopes
        .lookup_function_signature(ScopeId::ROOT, "foo")
        .unwrap();
    assert_eq!(signature.return_type, ExType::Int);
    assert!(!signature.builtin);
}

#[test]
fn test_method_call_is_typed_by_return() {
    let program = parse_ok("method foo = { return 1; }; int y = foo();");

    let StmtKind::AssignProperty { expr, .. } = &program.root.body[1].kind else {
        panic!("expected a property assignment");
    };
    assert_eq!(expr.ty, ExType::Int);
    assert!(matches!(&expr.kind, ExprKind::Call(call) if call.callee.value == "foo"));
}

#[test]
fn test_method_without_return_is_void() {
    let program = parse_ok(r#"method greet = { println("hi"); };"#);
    let StmtKind::AssignMethod { method, .. } = &program.root.body[0].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(method.return_type, ExType::Void);
}

#[test]
fn test_first_return_decides_type() {
    let program = parse_ok("method f = { return 1; return 2.0; };");
    let StmtKind::AssignMethod { method, .. } = &program.root.body[0].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(method.return_type, ExType::Int);
}

#[test]
fn test_method_sees_outer_properties() {
    let program = parse_ok("int x = 1; method f = { return x; };");
    let StmtKind::AssignMethod { method, .. } = &program.root.body[1].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(method.return_type, ExType::Int);
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let program = parse_ok("int x = 1; method f = { float x = 2.0; return x; };");
    let StmtKind::AssignMethod { method, .. } = &program.root.body[1].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(method.return_type, ExType::Float);
    assert_eq!(program.scopes.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Int));
}

#[test]
fn test_method_locals_do_not_leak() {
    let err = parse_source("method f = { int inner = 1; }; int y = inner;").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Scope(ScopeError::UndefinedIdentifier { ref name, .. }) if name == "inner"
    ));
}

#[test]
fn test_nested_methods() {
    let program = parse_ok("method outer = { method inner = { return 'c'; }; return inner(); };");
    let StmtKind::AssignMethod { method, .. } = &program.root.body[0].kind else {
        panic!("expected a method assignment");
    };
    assert_eq!(method.return_type, ExType::Char);

    let StmtKind::AssignMethod { method: inner, .. } = &method.body[0].kind else {
        panic!("expected a nested method");
    };
    assert_eq!(program.scopes.parent(inner.scope), Some(method.scope));
    assert!(program
        .scopes
        .lookup_function_signature(ScopeId::ROOT, "inner")
        .is_err());
}

// =========================================================================
// 类赋值
// =========================================================================

#[test]
fn test_assign_class() {
    let program = parse_ok("class Point = { int x = 1; method get = { return x; }; };");

    let StmtKind::AssignClass { identifier, class } = &program.root.body[0].kind else {
        panic!("expected a class assignment");
    };
    assert_eq!(identifier.value, "Point");
    assert_eq!(class.body.len(), 2);
    assert_eq!(
        program.scopes.owner(class.scope),
        &ScopeOwner::Class("Point".to_string())
    );

    let StmtKind::AssignMethod { method, .. } = &class.body[1].kind else {
        panic!("expected a member method");
    };
    assert_eq!(method.return_type, ExType::Int);
    assert_eq!(program.scopes.parent(method.scope), Some(class.scope));
    assert_eq!(program.scopes.lookup_type(ScopeId::ROOT, "Point"), Ok(ExType::Class));
}

#[test]
fn test_nested_class() {
    let program = parse_ok("class Outer = { class Inner = { bool flag = True; }; };");
    let StmtKind::AssignClass { class, .. } = &program.root.body[0].kind else {
        panic!("expected a class assignment");
    };
    assert!(matches!(class.body[0].kind, StmtKind::AssignClass { .. }));
}

// =========================================================================
// 返回与调用语句
// =========================================================================

#[test]
fn test_top_level_return() {
    let program = parse_ok("return 1 + 2 * 3;");
    assert!(matches!(program.root.body[0].kind, StmtKind::Return { .. }));
    assert_eq!(program.root.return_type, ExType::Int);
}

#[test]
fn test_call_statement() {
    let program = parse_ok(r#"println("a", 1, 2.5);"#);
    let StmtKind::MethodCall(call) = &program.root.body[0].kind else {
        panic!("expected a call statement");
    };
    assert_eq!(call.callee.value, "println");
    assert_eq!(call.args.len(), 3);
    assert_eq!(call.args[2].ty, ExType::Float);
}

#[test]
fn test_call_statement_without_args() {
    let program = parse_ok("method f = { return 1; }; f();");
    let StmtKind::MethodCall(call) = &program.root.body[1].kind else {
        panic!("expected a call statement");
    };
    assert!(call.args.is_empty());
}

#[test]
fn test_empty_program() {
    let program = parse_ok("");
    assert!(program.root.body.is_empty());
    assert_eq!(program.root.return_type, ExType::Void);
    assert_eq!(program.scopes.len(), 1);
}
