//! 代码生成器
//!
//! 遍历类型化 AST，进行类型检查并通过 [`Backend`] 发射 IR。
//! 核心设计原则：
//! 1. AST 是纯数据，生成过程只读取冻结的作用域树
//! 2. 后端可替换：生成器只依赖 [`Backend`] trait
//! 3. 第一个错误即终止，不生成部分模块
//!
//! Storage: properties declared in the root method or in a class body are
//! module globals; properties of nested methods are function-local
//! `alloca` slots.

pub mod expr;
pub mod ir_builder;
pub mod stmt;

#[cfg(test)]
mod tests;

pub use ir_builder::IrBuilder;

use crate::frontend::config::CompileConfig;
use crate::frontend::core::parser::ast::{BinOp, Program, Stmt};
use crate::frontend::core::scope::{ScopeError, ScopeId, ScopeOwner, ScopeTree, ValueTable};
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::middle::ir::ConstValue;
use crate::util::span::Span;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Backend failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("No insertion block is set")]
    NoInsertionPoint,

    #[error("Block `{0}` already ends in a terminator")]
    BlockTerminated(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// IR emission contract
///
/// Modeled on an LLVM-style builder: functions own blocks, the builder has
/// one insertion block, and values are opaque handles.
pub trait Backend {
    type Value: Clone + fmt::Debug;
    type Function: Copy + PartialEq + fmt::Debug;
    type Block: Copy + PartialEq + fmt::Debug;

    /// Declare a function; builtin signatures declare external functions
    fn declare_function(
        &mut self,
        name: &str,
        signature: &FunctionSignature,
    ) -> Self::Function;

    fn append_block(
        &mut self,
        function: Self::Function,
        label: &str,
    ) -> Self::Block;

    fn position_at_end(
        &mut self,
        block: Self::Block,
    );

    fn current_block(&self) -> Option<Self::Block>;

    fn is_terminated(
        &self,
        block: Self::Block,
    ) -> bool;

    fn const_value(
        &mut self,
        value: ConstValue,
    ) -> Self::Value;

    /// Function-local slot in the current function
    fn alloca(
        &mut self,
        ty: ExType,
        name: &str,
    ) -> BackendResult<Self::Value>;

    /// Module-level slot
    fn global(
        &mut self,
        ty: ExType,
        name: &str,
    ) -> Self::Value;

    fn store(
        &mut self,
        ptr: &Self::Value,
        value: &Self::Value,
    ) -> BackendResult<()>;

    fn load(
        &mut self,
        ty: ExType,
        ptr: &Self::Value,
    ) -> BackendResult<Self::Value>;

    /// `ty` is the operand type
    fn binary(
        &mut self,
        op: BinOp,
        ty: ExType,
        lhs: &Self::Value,
        rhs: &Self::Value,
    ) -> BackendResult<Self::Value>;

    fn call(
        &mut self,
        function: Self::Function,
        args: &[Self::Value],
    ) -> BackendResult<Self::Value>;

    fn branch(
        &mut self,
        target: Self::Block,
    ) -> BackendResult<()>;

    fn cond_branch(
        &mut self,
        cond: &Self::Value,
        then_block: Self::Block,
        else_block: Self::Block,
    ) -> BackendResult<()>;

    fn phi(
        &mut self,
        ty: ExType,
        incoming: &[(Self::Value, Self::Block)],
    ) -> BackendResult<Self::Value>;

    fn ret(
        &mut self,
        value: Option<&Self::Value>,
    ) -> BackendResult<()>;

    fn unreachable(&mut self) -> BackendResult<()>;
}

/// 代码生成错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("Type mismatch at {span}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ExType,
        found: ExType,
        span: Span,
    },

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("`{name}` takes {expected} argument(s) but {found} were supplied at {span}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Invalid literal `{raw}` at {span}")]
    InvalidLiteral { raw: String, span: Span },

    #[error("`{name}` belongs to another method and cannot be captured at {span}")]
    UnsupportedCapture { name: String, span: Span },

    #[error("A void value cannot be stored or passed at {span}")]
    VoidValue { span: Span },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CodegenError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CodegenError::TypeMismatch { span, .. }
            | CodegenError::ArityMismatch { span, .. }
            | CodegenError::InvalidLiteral { span, .. }
            | CodegenError::UnsupportedCapture { span, .. }
            | CodegenError::VoidValue { span } => Some(*span),
            CodegenError::Scope(error) => Some(error.span()),
            CodegenError::Backend(_) => None,
        }
    }
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Check `found` against `expected`
pub(crate) fn expect_type(
    expected: ExType,
    found: ExType,
    span: Span,
) -> CodegenResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CodegenError::TypeMismatch {
            expected,
            found,
            span,
        })
    }
}

/// A property bound during generation
pub struct Binding<B: Backend> {
    /// 存储位置（全局或 alloca）
    pub slot: B::Value,
    /// 声明处加载出的值
    pub loaded: B::Value,
    /// 声明所在的函数
    pub function: B::Function,
    pub global: bool,
}

/// The method being generated
struct Frame<B: Backend> {
    function: B::Function,
    return_type: ExType,
}

/// 代码生成上下文
pub struct CodegenContext<'a, B: Backend> {
    /// 后端
    backend: &'a mut B,

    /// 冻结的作用域树
    scopes: &'a ScopeTree,

    /// 属性绑定
    values: ValueTable<Binding<B>>,

    /// 用户方法对应的后端函数
    methods: ValueTable<B::Function>,

    /// 已声明的外部函数
    externals: IndexMap<String, B::Function>,

    /// 当前方法
    frame: Option<Frame<B>>,

    /// 限定名前缀（类名、外层方法名）
    path: Vec<String>,

    config: &'a CompileConfig,
}

impl<'a, B: Backend> CodegenContext<'a, B> {
    pub fn new(
        backend: &'a mut B,
        scopes: &'a ScopeTree,
        config: &'a CompileConfig,
    ) -> Self {
        Self {
            backend,
            scopes,
            values: ValueTable::new(),
            methods: ValueTable::new(),
            externals: IndexMap::new(),
            frame: None,
            path: Vec::new(),
            config,
        }
    }

    /// Name of a function or global declared in the current path
    fn qualified_name(
        &self,
        name: &str,
    ) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path.join("."), name)
        }
    }

    /// Properties of the root method and of class bodies live in globals
    fn is_global_scope(
        &self,
        scope: ScopeId,
    ) -> bool {
        scope == ScopeId::ROOT || matches!(self.scopes.owner(scope), ScopeOwner::Class(_))
    }

    fn current_function(&self) -> Option<B::Function> {
        self.frame.as_ref().map(|frame| frame.function)
    }

    /// Generate one function body: fresh entry block, statements, epilogue;
    /// restores the caller's insertion block afterwards
    fn gen_function(
        &mut self,
        name: &str,
        return_type: ExType,
        body: &[Stmt],
    ) -> CodegenResult<B::Function> {
        let function = self
            .backend
            .declare_function(name, &FunctionSignature::method(return_type));
        debug!("Generating function `{}` -> {}", name, return_type);
        self.gen_function_body(function, return_type, body)
    }

    fn gen_function_body(
        &mut self,
        function: B::Function,
        return_type: ExType,
        body: &[Stmt],
    ) -> CodegenResult<B::Function> {
        let saved_frame = self.frame.replace(Frame {
            function,
            return_type,
        });
        let saved_block = self.backend.current_block();

        let entry = self.backend.append_block(function, "entry");
        self.backend.position_at_end(entry);

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.gen_epilogue(return_type)?;

        self.frame = saved_frame;
        if let Some(block) = saved_block {
            self.backend.position_at_end(block);
        }
        Ok(function)
    }

    /// Terminate a fall-through end of function
    fn gen_epilogue(
        &mut self,
        return_type: ExType,
    ) -> CodegenResult<()> {
        let Some(block) = self.backend.current_block() else {
            return Err(BackendError::NoInsertionPoint.into());
        };
        if self.backend.is_terminated(block) {
            return Ok(());
        }
        if return_type == ExType::Void {
            self.backend.ret(None)?;
        } else {
            self.backend.unreachable()?;
        }
        Ok(())
    }

    /// Generate the whole program, the root method becoming the entry
    /// function
    pub fn gen_program(
        &mut self,
        program: &Program,
    ) -> CodegenResult<B::Function> {
        let entry_name = self.config.entry_name.clone();
        self.gen_function(&entry_name, program.root.return_type, &program.root.body)
    }
}

/// Generate IR for `program` through `backend`
pub fn generate<B: Backend>(
    program: &Program,
    backend: &mut B,
    config: &CompileConfig,
) -> CodegenResult<()> {
    info!("Generating code for module `{}`", config.module_name);
    let mut ctx = CodegenContext::new(backend, &program.scopes, config);
    ctx.gen_program(program)?;
    debug!("Code generation complete");
    Ok(())
}
