//! Core algorithm layer
//!
//! Lexer, scope tree, type system and parser.

pub mod lexer;
pub mod parser;
pub mod scope;
pub mod type_system;

// Re-export commonly used items
pub use lexer::tokenize;
pub use parser::parse;
