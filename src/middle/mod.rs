//! Intermediate representation and code generation
//!
//! Lowers the typed AST into the SSA form of [`ir`] through the
//! [`codegen::Backend`] trait.

pub mod codegen;
pub mod ir;

pub use codegen::{generate, Backend, CodegenError, IrBuilder};
pub use ir::ModuleIr;
