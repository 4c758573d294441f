//! Tokenizer implementation
//!
//! At every position all token definitions are tried. Among the matching
//! ones the winner is chosen by, in order:
//!
//! 1. lowest priority integer,
//! 2. longest matched text,
//! 3. earliest declaration.
//!
//! Comment patterns carry negative priorities so whole comment forms are
//! consumed before any code token can claim their prefix, and the generic
//! identifier pattern carries the highest priority so reserved words win.

use super::definitions::{definitions, TokenDefinition};
use super::tokens::{LexError, Token};
use crate::util::span::{Position, Span};
use std::cmp::Reverse;

/// Main lexer structure
pub struct Lexer<'a> {
    source: &'a str,
    position: Position,
    definitions: &'a [TokenDefinition],
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source using the Sapling grammar
    pub fn new(source: &'a str) -> Self {
        Self::with_definitions(source, definitions())
    }

    /// Create a lexer over a custom definition table
    pub fn with_definitions(
        source: &'a str,
        definitions: &'a [TokenDefinition],
    ) -> Self {
        Self {
            source,
            position: Position::start(),
            definitions,
        }
    }

    /// Get current position
    pub fn position(&self) -> Position {
        self.position
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position.offset..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        let skipped = &rest[..rest.len() - trimmed.len()];
        self.position = self.position.advance(skipped);
    }

    /// Pick the winning definition for the text at the cursor
    pub fn select(
        &self,
        rest: &str,
    ) -> Option<(&'a TokenDefinition, usize)> {
        self.definitions
            .iter()
            .enumerate()
            .filter_map(|(index, def)| def.match_len(rest).map(|len| (index, def, len)))
            .min_by_key(|&(index, def, len)| (def.priority, Reverse(len), index))
            .map(|(_, def, len)| (def, len))
    }

    /// Generate next token, `Ok(None)` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let rest = self.rest();
        let Some(found) = rest.chars().next() else {
            return Ok(None);
        };

        let (def, len) = self.select(rest).ok_or(LexError::NoMatch {
            position: self.position,
            found,
        })?;

        let text = &rest[..len];
        let start = self.position;
        self.position = start.advance(text);
        Ok(Some(def.build(text, Span::new(start, self.position))))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
