//! Parser state and error handling

use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::scope::{ScopeError, ScopeTree};
use crate::util::span::Span;
use std::fmt;
use thiserror::Error;

/// What the parser expected but did not find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedToken,
    UnexpectedKeyword,
    MissingAssignmentOperator,
    MissingSemicolon,
    MissingOpeningBrace,
    MissingClosingBrace,
    MissingOpeningParen,
    MissingClosingParen,
    MissingTernaryOperator,
    InvalidExpression,
    UnexpectedEof,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let message = match self {
            SyntaxErrorKind::UnexpectedToken => "Unexpected token",
            SyntaxErrorKind::UnexpectedKeyword => "Unexpected keyword",
            SyntaxErrorKind::MissingAssignmentOperator => "Missing assignment operator `=`",
            SyntaxErrorKind::MissingSemicolon => "Missing semicolon",
            SyntaxErrorKind::MissingOpeningBrace => "Missing opening brace `{`",
            SyntaxErrorKind::MissingClosingBrace => "Missing closing brace `}`",
            SyntaxErrorKind::MissingOpeningParen => "Missing opening parenthesis `(`",
            SyntaxErrorKind::MissingClosingParen => "Missing closing parenthesis `)`",
            SyntaxErrorKind::MissingTernaryOperator => "Missing ternary operator `:`",
            SyntaxErrorKind::InvalidExpression => "Invalid expression",
            SyntaxErrorKind::UnexpectedEof => "Unexpected end of input",
        };
        f.write_str(message)
    }
}

/// Syntax error at a token (or at the end of input when `found` is `None`)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}{}", describe_found(.found, .text))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub found: Option<TokenKind>,
    pub text: String,
    pub span: Span,
}

fn describe_found(
    found: &Option<TokenKind>,
    text: &str,
) -> String {
    match found {
        Some(kind) => format!(": found {} `{}`", kind, text),
        None => ": reached end of input".to_string(),
    }
}

/// Parse error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax(error) => error.span,
            ParseError::Scope(error) => error.span(),
        }
    }

    /// Syntax error kind, if this is a syntax error
    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            ParseError::Syntax(error) => Some(error.kind),
            ParseError::Scope(_) => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state: a forward-only cursor over an immutable token slice plus
/// the scope tree being built.
///
/// Comment tokens are invisible: the cursor never rests on one and
/// lookahead steps over them.
pub struct ParserState<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: Span,
    pub(crate) scopes: ScopeTree,
}

impl<'a> ParserState<'a> {
    pub fn new(
        tokens: &'a [Token],
        scopes: ScopeTree,
    ) -> Self {
        let end = tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end))
            .unwrap_or_else(Span::dummy);
        let mut state = Self {
            tokens,
            pos: 0,
            end,
            scopes,
        };
        state.skip_comments();
        state
    }

    /// Give back the scope tree once parsing is done
    pub fn into_scopes(self) -> ScopeTree {
        self.scopes
    }

    fn skip_comments(&mut self) {
        while self.tokens.get(self.pos).is_some_and(Token::is_comment) {
            self.pos += 1;
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// The next significant token after the current one
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens
            .get(self.pos + 1..)?
            .iter()
            .find(|t| !t.is_comment())
    }

    /// Span of the current token, or the end of input
    pub fn span(&self) -> Span {
        self.current().map(|t| t.span).unwrap_or(self.end)
    }

    pub fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.skip_comments();
        Some(token)
    }

    pub fn at(
        &self,
        kind: TokenKind,
        text: &str,
    ) -> bool {
        self.current().is_some_and(|t| t.is(kind, text))
    }

    pub fn at_kind(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    pub fn at_delimiter(
        &self,
        text: &str,
    ) -> bool {
        self.at(TokenKind::Delimiter, text)
    }

    /// Consume the delimiter `text` or fail with `missing`
    pub fn expect_delimiter(
        &mut self,
        text: &str,
        missing: SyntaxErrorKind,
    ) -> Result<&'a Token, SyntaxError> {
        if self.at_delimiter(text) {
            // at_delimiter guarantees a current token
            self.bump().ok_or_else(|| self.error(missing))
        } else {
            Err(self.error(missing))
        }
    }

    /// Build an error pointing at the current token
    pub fn error(
        &self,
        kind: SyntaxErrorKind,
    ) -> SyntaxError {
        match self.current() {
            Some(token) => SyntaxError {
                kind,
                found: Some(token.kind),
                text: token.text.clone(),
                span: token.span,
            },
            None => SyntaxError {
                kind,
                found: None,
                text: String::new(),
                span: self.end,
            },
        }
    }

    /// Like [`ParserState::error`], but reports `UnexpectedEof` at the end
    /// of input
    pub fn error_or_eof(
        &self,
        kind: SyntaxErrorKind,
    ) -> SyntaxError {
        if self.at_end() {
            self.error(SyntaxErrorKind::UnexpectedEof)
        } else {
            self.error(kind)
        }
    }
}
