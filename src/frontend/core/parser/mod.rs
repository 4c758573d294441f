//! Parser module
//!
//! Single-pass recursive descent over the token vector. Scopes are created
//! while descending into method and class bodies and every expression's
//! type is resolved as its node is built, so the first failure aborts the
//! parse with no partial tree.

pub mod ast;
pub mod expressions;
pub mod optree;
pub mod parser_state;
pub mod statements;
#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use ast::*;
pub use parser_state::{ParseError, ParseResult, ParserState, SyntaxError, SyntaxErrorKind};

use crate::frontend::core::lexer::tokens::Token;
use crate::frontend::core::scope::{ScopeId, ScopeTree};
use tracing::debug;

/// Name of the method holding the top level of a compilation unit
pub const ROOT_METHOD_NAME: &str = "main";

/// Parse tokens into a program
///
/// `scopes` is the tree to build on; the embedding application registers
/// builtin signatures in its root scope beforehand.
///
/// # Example
/// ```text
/// int x = 5;
/// method twice = { return x * 2; };
/// println(twice());
/// ```
pub fn parse(
    tokens: &[Token],
    scopes: ScopeTree,
) -> Result<Program, ParseError> {
    let mut state = ParserState::new(tokens, scopes);
    let mut body = Vec::new();

    while !state.at_end() {
        body.push(state.parse_statement(ScopeId::ROOT)?);
    }

    let return_type = statements::first_return_type(&body);
    let scopes = state.into_scopes();
    debug!(
        "Parsed {} top-level statements in {} scopes",
        body.len(),
        scopes.len()
    );

    Ok(Program {
        root: Method {
            name: ROOT_METHOD_NAME.to_string(),
            scope: ScopeId::ROOT,
            body,
            return_type,
        },
        scopes,
    })
}
