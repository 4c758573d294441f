//! Token types

use crate::util::span::{Position, Span};
use std::fmt;

/// Lexer error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    /// No token definition matches at this position
    #[error("No token matches at {position}: unexpected `{found}`")]
    NoMatch { position: Position, found: char },
}

impl LexError {
    /// Position of the offending character
    pub fn position(&self) -> Position {
        match self {
            LexError::NoMatch { position, .. } => *position,
        }
    }
}

/// Token kind
///
/// A closed classification; the raw text of the token carries the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    Identifier,
    Keyword,
    Type,
    Builtin,
    Delimiter,
    Ternary,
    Assign,
    ArithmeticOperator,
    ComparisonOperator,
    BooleanOperator,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharacterLiteral,
    BooleanLiteral,
}

impl TokenKind {
    /// Literal-class tokens start a literal expression
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharacterLiteral
                | TokenKind::BooleanLiteral
        )
    }

    /// Operator-class tokens continue an optree
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::ArithmeticOperator
                | TokenKind::ComparisonOperator
                | TokenKind::BooleanOperator
        )
    }

    /// Tokens that may name a callee
    pub fn is_callable(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Builtin)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            TokenKind::Comment => "comment",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Type => "type",
            TokenKind::Builtin => "builtin",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Ternary => "ternary operator",
            TokenKind::Assign => "assignment operator",
            TokenKind::ArithmeticOperator => "arithmetic operator",
            TokenKind::ComparisonOperator => "comparison operator",
            TokenKind::BooleanOperator => "boolean operator",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharacterLiteral => "character literal",
            TokenKind::BooleanLiteral => "boolean literal",
        };
        write!(f, "{}", name)
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Check kind and text at once, e.g. `is(TokenKind::Delimiter, ";")`
    pub fn is(
        &self,
        kind: TokenKind,
        text: &str,
    ) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} `{}` at {}", self.kind, self.text, self.span)
    }
}
