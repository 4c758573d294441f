//! 编译器核心
//!
//! 词法分析、语法分析与代码生成的统一入口。

use super::builtins::register_builtins;
use super::config::CompileConfig;
use super::core::lexer::{tokenize, LexError, Token};
use super::core::parser::{self, ParseError, Program};
use super::core::scope::ScopeTree;
use crate::middle::codegen::{self, Backend, CodegenError, IrBuilder};
use crate::middle::ir::ModuleIr;
use crate::util::span::Span;
use thiserror::Error;
use tracing::{debug, info};

/// 编译器
///
/// # 示例
///
/// ```
/// use sapling::frontend::Compiler;
///
/// let module = Compiler::new().compile("int x = 1 + 2;").unwrap();
/// assert!(module.function_by_name("main").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    /// 编译配置
    config: CompileConfig,
}

impl Compiler {
    /// 创建新编译器
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置创建编译器
    #[inline]
    pub fn with_config(config: CompileConfig) -> Self {
        Self { config }
    }

    /// 获取编译配置
    #[inline]
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// 只进行词法分析
    pub fn lex(
        &self,
        source: &str,
    ) -> Result<Vec<Token>, CompileError> {
        Ok(tokenize(source)?)
    }

    /// 词法分析与语法分析，返回 AST 和冻结的作用域树
    pub fn parse(
        &self,
        source: &str,
    ) -> Result<Program, CompileError> {
        let tokens = self.lex(source)?;
        info!("Parsing {} tokens", tokens.len());

        let mut scopes = ScopeTree::new().with_strict_redeclaration(self.config.strict_redeclaration);
        if self.config.register_builtins {
            register_builtins(&mut scopes).map_err(ParseError::from)?;
        }
        Ok(parser::parse(&tokens, scopes)?)
    }

    /// 通过任意后端生成代码
    pub fn generate<B: Backend>(
        &self,
        program: &Program,
        backend: &mut B,
    ) -> Result<(), CompileError> {
        codegen::generate(program, backend, &self.config)?;
        Ok(())
    }

    /// 完整编译，产出 IR 模块
    pub fn compile(
        &self,
        source: &str,
    ) -> Result<ModuleIr, CompileError> {
        debug!("Compiling source ({} bytes)", source.len());
        let program = self.parse(source)?;

        let mut builder = IrBuilder::new(self.config.module_name.clone());
        self.generate(&program, &mut builder)?;
        let module = builder.finish();
        info!(
            "Compiled module `{}`: {} function(s), {} global(s)",
            module.name,
            module.functions.len(),
            module.globals.len()
        );
        Ok(module)
    }
}

/// 编译错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// 词法分析错误
    #[error("Lexical error")]
    Lex(#[from] LexError),

    /// 语法分析错误
    #[error("Parse error")]
    Parse(#[from] ParseError),

    /// 代码生成错误
    #[error("Codegen error")]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// 错误所在的源码位置
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lex(LexError::NoMatch { position, .. }) => {
                Some(Span::new(*position, *position))
            }
            CompileError::Parse(error) => Some(error.span()),
            CompileError::Codegen(error) => error.span(),
        }
    }
}
