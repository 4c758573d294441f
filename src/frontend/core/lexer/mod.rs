//! Lexer module
//!
//! Regex-driven tokenizer: a static table of token definitions, each with a
//! tie-break priority, is evaluated at every source position.

pub mod definitions;
pub mod tokenizer;
pub mod tokens;

#[cfg(test)]
mod tests;

// Re-export types
pub use definitions::{definitions, TokenDefinition};
pub use tokenizer::Lexer;
pub use tokens::{LexError, Token, TokenKind};

/// Tokenize source code
///
/// Comment tokens are kept in the output; the parser skips them.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tracing::debug!("Lexing {} bytes", source.len());

    let tokens = Lexer::new(source)
        .inspect(|token| {
            if let Ok(token) = token {
                log_token(token);
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Lexing complete: {} tokens", tokens.len());
    Ok(tokens)
}

/// Log a token for debugging
fn log_token(token: &Token) {
    tracing::trace!(
        "{} {:?} at {} to {}",
        token.kind,
        token.text,
        token.span.start.offset,
        token.span.end.offset
    );
}
