//! Lexer tests module
//!
//! Organized test modules for better maintainability:
//! - basic: 基础测试（标识符、空白符、位置等）
//! - literals: 字面量测试（整数、浮点、字符串、字符、布尔）
//! - operators: 运算符与分隔符测试
//! - keywords: 关键字、类型与内置函数测试
//! - comments: 注释测试
//! - priority: 优先级与最长匹配测试
//! - errors: 错误处理测试


use crate::frontend::core::lexer::{tokenize, TokenKind};

/// Kinds of all tokens in `source`
pub(super) fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

/// Texts of all tokens in `source`
pub(super) fn texts(source: &str) -> Vec<String> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect()
}
