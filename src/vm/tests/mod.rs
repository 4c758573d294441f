//! VM tests module
//!
//! - execution: 控制流、存储与调用
//! - externals: print / println / input
//! - errors: 运行时错误

mod errors;
mod execution;

use crate::frontend::Compiler;
use crate::middle::ir::ModuleIr;
use crate::vm::{Value, Vm, VmResult};

pub(super) fn compile(source: &str) -> ModuleIr {
    Compiler::new().compile(source).unwrap()
}

/// Compile and run `main`, returning its value and the captured output
pub(super) fn run(source: &str) -> VmResult<(Value, String)> {
    let module = compile(source);
    let mut vm = Vm::new(&module);
    let value = vm.run("main")?;
    Ok((value, vm.output().to_string()))
}

pub(super) fn run_value(source: &str) -> Value {
    run(source).unwrap().0
}
