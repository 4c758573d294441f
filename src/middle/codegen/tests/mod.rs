//! Codegen tests module
//!
//! - stmt: 语句生成（存储、方法、类、返回）
//! - expr: 表达式生成（运算、三元、调用）
//! - errors: 类型检查与生成错误
//! - builder: IR 构建器与文本输出


use crate::frontend::builtins::register_builtins;
use crate::frontend::config::CompileConfig;
use crate::frontend::core::lexer::tokenize;
use crate::frontend::core::parser::parse;
use crate::frontend::core::scope::ScopeTree;
use crate::middle::codegen::{generate, CodegenError, IrBuilder};
use crate::middle::ir::{FunctionIr, ModuleIr};

pub(super) fn generate_source(source: &str) -> Result<ModuleIr, CodegenError> {
    let tokens = tokenize(source).unwrap();
    let mut scopes = ScopeTree::new();
    register_builtins(&mut scopes).unwrap();
    let program = parse(&tokens, scopes).unwrap();

    let mut builder = IrBuilder::new("test");
    generate(&program, &mut builder, &CompileConfig::default())?;
    Ok(builder.finish())
}

pub(super) fn generate_ok(source: &str) -> ModuleIr {
    generate_source(source).unwrap()
}

pub(super) fn function<'m>(
    module: &'m ModuleIr,
    name: &str,
) -> &'m FunctionIr {
    module
        .function_by_name(name)
        .map(|(_, function)| function)
        .unwrap_or_else(|| panic!("no function named {}", name))
}
