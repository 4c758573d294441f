//! Execution tests

use super::{run, run_value};
use crate::vm::Value;

// =========================================================================
// 表达式求值
// =========================================================================

#[test]
fn test_precedence_evaluates() {
    assert_eq!(run_value("return 1 + 2 * 3;"), Value::Int(7));
    assert_eq!(run_value("return (1 + 2) * 3;"), Value::Int(9));
    assert_eq!(run_value("return 10 - 4 - 3;"), Value::Int(3));
    assert_eq!(run_value("return 7 / 2;"), Value::Int(3));
}

#[test]
fn test_float_arithmetic() {
    assert_eq!(run_value("return 3.0 / 2.0;"), Value::Float(1.5));
}

#[test]
fn test_comparisons_and_booleans() {
    assert_eq!(run_value("return 1 < 2 && 3 >= 3;"), Value::Bool(true));
    assert_eq!(run_value("return 'a' > 'b' || False;"), Value::Bool(false));
    assert_eq!(run_value("return True ^ True;"), Value::Bool(false));
    assert_eq!(run_value(r#"return "ab" == "ab";"#), Value::Bool(true));
    assert_eq!(run_value("return 2.5 != 2.5;"), Value::Bool(false));
}

#[test]
fn test_logical_operators_short_circuit() {
    let source = r#"
        method side = { println("side"); return True; };
        bool a = False && side();
        bool b = True || side();
        return a || b;
    "#;
    let (value, output) = run(source).unwrap();
    assert_eq!(value, Value::Bool(true));
    assert_eq!(output, "");

    let (value, output) = run(r#"method side = { println("side"); return False; }; return True && side();"#).unwrap();
    assert_eq!(value, Value::Bool(false));
    assert_eq!(output, "side\n");
}

// =========================================================================
// 三元表达式
// =========================================================================

#[test]
fn test_ternary_takes_branch() {
    assert_eq!(
        run_value("int a = 2; int b = 1; int z = a > b ? 1 : 0; return z;"),
        Value::Int(1)
    );
    assert_eq!(
        run_value("int a = 1; int b = 2; int z = a > b ? 1 : 0; return z;"),
        Value::Int(0)
    );
}

#[test]
fn test_nested_ternary() {
    assert_eq!(
        run_value("return False ? 1 : (True ? 2 : 3);"),
        Value::Int(2)
    );
}

// =========================================================================
// 方法与类
// =========================================================================

#[test]
fn test_method_call() {
    assert_eq!(
        run_value("method foo = { return 1; }; return foo() + 41;"),
        Value::Int(42)
    );
}

#[test]
fn test_method_reads_global() {
    assert_eq!(
        run_value("int base = 10; method plus = { return base + 5; }; return plus();"),
        Value::Int(15)
    );
}

#[test]
fn test_method_locals() {
    assert_eq!(
        run_value("method f = { int a = 3; int b = a * a; return b - 1; }; return f();"),
        Value::Int(8)
    );
}

#[test]
fn test_nested_methods() {
    assert_eq!(
        run_value("method outer = { method inner = { return 2; }; return inner() * 10; }; return outer();"),
        Value::Int(20)
    );
}

#[test]
fn test_class_members() {
    assert_eq!(
        run_value("class Counter = { int start = 3; method get = { return start * 2; }; }; return 0;"),
        Value::Int(0)
    );
}

#[test]
fn test_first_return_wins() {
    assert_eq!(run_value("return 1; return 2;"), Value::Int(1));
}

#[test]
fn test_void_program() {
    let (value, output) = run("int x = 5;").unwrap();
    assert_eq!(value, Value::Void);
    assert!(output.is_empty());
}
