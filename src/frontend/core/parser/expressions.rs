//! Expression parsing
//!
//! An expression is a single expression followed by any number of
//! continuations: an operator starts an optree, `?` starts a ternary.

use super::ast::*;
use super::optree::fold_optree;
use super::parser_state::{ParseResult, ParserState, SyntaxErrorKind};
use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::scope::{ScopeError, ScopeId};
use crate::frontend::core::type_system::ExType;
use crate::util::span::Span;
use crate::util::Spanned;
use tracing::trace;

impl<'a> ParserState<'a> {
    /// Parse a full expression
    pub fn parse_expression(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Expr> {
        let mut expr = self.parse_single_expression(scope)?;
        loop {
            match self.current() {
                Some(token) if token.kind.is_operator() => {
                    expr = self.parse_optree(scope, expr)?;
                }
                Some(token) if token.is(TokenKind::Ternary, "?") => {
                    expr = self.parse_ternary(scope, expr)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parenthesized expression, literal, identifier or call
    pub fn parse_single_expression(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Expr> {
        let Some(token) = self.current() else {
            return Err(self.error(SyntaxErrorKind::UnexpectedEof).into());
        };

        match token.kind {
            TokenKind::Delimiter if token.text == "(" => {
                self.bump();
                let inner = self.parse_expression(scope)?;
                let close = self.expect_delimiter(")", SyntaxErrorKind::MissingClosingParen)?;
                Ok(Expr {
                    span: token.span.to(close.span),
                    ..inner
                })
            }
            kind if kind.is_literal() => {
                self.bump();
                let literal = LiteralKind::from_token(kind)
                    .ok_or_else(|| self.error(SyntaxErrorKind::InvalidExpression))?;
                Ok(Expr {
                    kind: ExprKind::Literal {
                        kind: literal,
                        raw: token.text.clone(),
                    },
                    ty: literal.ty(),
                    span: token.span,
                })
            }
            TokenKind::Identifier | TokenKind::Builtin
                if self.peek().is_some_and(|t| t.is(TokenKind::Delimiter, "(")) =>
            {
                let (call, ty, span) = self.parse_call(scope)?;
                Ok(Expr {
                    kind: ExprKind::Call(call),
                    ty,
                    span,
                })
            }
            TokenKind::Identifier => {
                self.bump();
                let ty = self
                    .scopes
                    .lookup_type(scope, &token.text)
                    .map_err(|e| e.at(token.span))?;
                if !ty.is_storable() {
                    return Err(ScopeError::NotAValue {
                        name: token.text.clone(),
                        ty,
                        span: token.span,
                    }
                    .into());
                }
                trace!("Resolved `{}` to {}", token.text, ty);
                Ok(Expr {
                    kind: ExprKind::Identifier(token.text.clone()),
                    ty,
                    span: token.span,
                })
            }
            _ => Err(self.error(SyntaxErrorKind::InvalidExpression).into()),
        }
    }

    /// Collect `(operator, operand)` pairs after `first` and fold them by
    /// precedence
    fn parse_optree(
        &mut self,
        scope: ScopeId,
        first: Expr,
    ) -> ParseResult<Expr> {
        let mut rest = Vec::new();
        while let Some(token) = self.current().filter(|t| t.kind.is_operator()) {
            let op = BinOp::from_symbol(&token.text)
                .ok_or_else(|| self.error(SyntaxErrorKind::InvalidExpression))?;
            self.bump();
            let operand = self.parse_single_expression(scope)?;
            rest.push((op, operand));
        }
        trace!("Folding optree of {} operators", rest.len());
        Ok(fold_optree(first, rest))
    }

    /// `? <expr> : <expr>` after `condition`
    fn parse_ternary(
        &mut self,
        scope: ScopeId,
        condition: Expr,
    ) -> ParseResult<Expr> {
        self.bump();
        let then_branch = self.parse_expression(scope)?;

        if !self.at(TokenKind::Ternary, ":") {
            return Err(self.error(SyntaxErrorKind::MissingTernaryOperator).into());
        }
        self.bump();

        let else_branch = self.parse_expression(scope)?;
        let span = condition.span.to(else_branch.span);
        Ok(Expr {
            ty: then_branch.ty,
            kind: ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        })
    }

    /// `<callee>(<args>)`, returning the call, the callee's return type and
    /// the span through the closing parenthesis
    pub fn parse_call(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<(Call, ExType, Span)> {
        let callee = match self.current() {
            Some(token) if token.kind.is_callable() => {
                self.bump();
                Spanned::new(token.text.clone(), token.span)
            }
            _ => return Err(self.error_or_eof(SyntaxErrorKind::UnexpectedToken).into()),
        };
        let return_type = self
            .scopes
            .lookup_function_signature(scope, &callee.value)
            .map_err(|e| e.at(callee.span))?
            .return_type;

        self.expect_delimiter("(", SyntaxErrorKind::MissingOpeningParen)?;
        let mut args = Vec::new();
        if !self.at_delimiter(")") {
            loop {
                args.push(self.parse_expression(scope)?);
                if !self.at_delimiter(",") {
                    break;
                }
                self.bump();
            }
        }
        let close = self.expect_delimiter(")", SyntaxErrorKind::MissingClosingParen)?;

        let span = callee.span.to(close.span);
        Ok((Call { callee, args }, return_type, span))
    }
}
