//! Frontend compilation pipeline
//!
//! Tokenizer, scopes, and the single-pass parser that produces the typed
//! AST, plus the [`Compiler`] facade that drives them.

pub mod builtins;
pub mod compiler;
pub mod config;
pub mod core;

pub use compiler::{CompileError, Compiler};
pub use config::{CompileConfig, ConfigError};
