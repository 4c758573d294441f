//! Runtime error tests

use super::{compile, run};
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::middle::codegen::{Backend, IrBuilder};
use crate::middle::ir::ConstValue;
use crate::vm::{Vm, VmConfig, VmError};

#[test]
fn test_division_by_zero() {
    assert_eq!(run("return 1 / 0;").unwrap_err(), VmError::DivisionByZero);
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    let module = compile("return 1.0 / 0.0;");
    let value = Vm::new(&module).run("main").unwrap();
    assert_eq!(value, crate::vm::Value::Float(f64::INFINITY));
}

#[test]
fn test_missing_entry() {
    let module = compile("int x = 1;");
    assert_eq!(
        Vm::new(&module).run("start").unwrap_err(),
        VmError::MissingEntry("start".to_string())
    );
}

#[test]
fn test_unreachable_fallthrough() {
    // `f` returns int, but its body after the return is unreachable
    let mut builder = IrBuilder::new("m");
    let f = builder.declare_function("f", &FunctionSignature::method(ExType::Int));
    let entry = builder.append_block(f, "entry");
    builder.position_at_end(entry);
    builder.unreachable().unwrap();

    let module = builder.finish();
    assert_eq!(
        Vm::new(&module).run("f").unwrap_err(),
        VmError::Unreachable("f".to_string())
    );
}

#[test]
fn test_unknown_external() {
    let mut builder = IrBuilder::new("m");
    let missing = builder.declare_function(
        "launch",
        &FunctionSignature::builtin(ExType::Void, Vec::new(), false),
    );
    let main = builder.declare_function("main", &FunctionSignature::method(ExType::Void));
    let entry = builder.append_block(main, "entry");
    builder.position_at_end(entry);
    builder.call(missing, &[]).unwrap();
    builder.ret(None).unwrap();

    let module = builder.finish();
    assert_eq!(
        Vm::new(&module).run("main").unwrap_err(),
        VmError::UnknownExternal("launch".to_string())
    );
}

#[test]
fn test_call_depth_limit() {
    let module = compile("method f = { return 1; }; return f();");
    let config = VmConfig {
        max_call_depth: 1,
        ..VmConfig::default()
    };
    assert_eq!(
        Vm::with_config(&module, config).run("main").unwrap_err(),
        VmError::CallDepthExceeded(1)
    );
}

#[test]
fn test_uninitialized_global() {
    let mut builder = IrBuilder::new("m");
    let main = builder.declare_function("main", &FunctionSignature::method(ExType::Int));
    let entry = builder.append_block(main, "entry");
    builder.position_at_end(entry);
    let slot = builder.global(ExType::Int, "g");
    let value = builder.load(ExType::Int, &slot).unwrap();
    builder.ret(Some(&value)).unwrap();

    let module = builder.finish();
    assert_eq!(
        Vm::new(&module).run("main").unwrap_err(),
        VmError::UninitializedSlot("@g".to_string())
    );
}

#[test]
fn test_branch_on_non_bool() {
    let mut builder = IrBuilder::new("m");
    let main = builder.declare_function("main", &FunctionSignature::method(ExType::Void));
    let entry = builder.append_block(main, "entry");
    let other = builder.append_block(main, "other");
    builder.position_at_end(entry);
    let cond = builder.const_value(ConstValue::Int(1));
    builder.cond_branch(&cond, other, other).unwrap();
    builder.position_at_end(other);
    builder.ret(None).unwrap();

    let module = builder.finish();
    assert!(matches!(
        Vm::new(&module).run("main").unwrap_err(),
        VmError::TypeError(_)
    ));
}
