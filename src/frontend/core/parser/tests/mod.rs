//! Parser tests module
//!
//! - statements: 语句解析（属性、方法、类、返回、调用）
//! - expressions: 表达式解析（优先级、三元、调用、类型推导）
//! - errors: 语法与作用域错误
//! - comments: 注释透明性
//! - state: 解析器游标

mod statements;

use crate::frontend::builtins::register_builtins;
use crate::frontend::core::lexer::tokenize;
use crate::frontend::core::parser::{parse, ParseError, Program, SyntaxError};
use crate::frontend::core::scope::ScopeTree;

/// Root scope with the builtins registered
pub(super) fn root_scopes() -> ScopeTree {
    let mut scopes = ScopeTree::new();
    register_builtins(&mut scopes).unwrap();
    scopes
}

pub(super) fn parse_source(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source).unwrap();
    parse(&tokens, root_scopes())
}

pub(super) fn parse_ok(source: &str) -> Program {
    parse_source(source).unwrap()
}

pub(super) fn syntax_error(source: &str) -> SyntaxError {
    match parse_source(source) {
        Err(ParseError::Syntax(error)) => error,
        other => panic!("expected a syntax error, got {:?}", other),
    }
}
