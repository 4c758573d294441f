//! Statement parsing
//!
//! Statements are dispatched on their first token. Assignments share one
//! skeleton: `<type> <identifier> = <right-hand side> ;` where the
//! right-hand side is an expression for properties and a braced body for
//! methods and classes.

use super::ast::*;
use super::parser_state::{ParseResult, ParserState, SyntaxErrorKind};
use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::scope::{ScopeId, ScopeOwner};
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::util::Spanned;
use tracing::debug;

impl<'a> ParserState<'a> {
    /// Parse one statement of a method body
    pub fn parse_statement(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Stmt> {
        let Some(token) = self.current() else {
            return Err(self.error(SyntaxErrorKind::UnexpectedEof).into());
        };

        let stmt = match token.kind {
            TokenKind::Type => self.parse_assignment(scope)?,
            TokenKind::Keyword if token.text == "return" => self.parse_return(scope)?,
            TokenKind::Keyword => return Err(self.error(SyntaxErrorKind::UnexpectedKeyword).into()),
            TokenKind::Identifier | TokenKind::Builtin
                if self.peek().is_some_and(|t| t.is(TokenKind::Delimiter, "(")) =>
            {
                self.parse_call_statement(scope)?
            }
            _ => return Err(self.error(SyntaxErrorKind::UnexpectedToken).into()),
        };

        debug!("Parsed statement at {}", stmt.span);
        Ok(stmt)
    }

    /// Parse one member of a class body; only assignments are allowed
    pub fn parse_class_member(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Stmt> {
        if self.at_kind(TokenKind::Type) {
            self.parse_assignment(scope)
        } else {
            Err(self.error_or_eof(SyntaxErrorKind::UnexpectedToken).into())
        }
    }

    /// `<type> <identifier> = ... ;`
    fn parse_assignment(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Stmt> {
        let start = self.span();
        let ty = self
            .bump()
            .and_then(|t| ExType::from_name(&t.text))
            .ok_or_else(|| self.error(SyntaxErrorKind::UnexpectedToken))?;
        let identifier = self.parse_identifier()?;

        if !self.at_kind(TokenKind::Assign) {
            return Err(self.error(SyntaxErrorKind::MissingAssignmentOperator).into());
        }
        self.bump();

        let kind = match ty {
            ExType::Method => {
                let method = self.parse_method_body(scope, &identifier.value)?;
                self.scopes
                    .declare_function_signature(
                        scope,
                        &identifier.value,
                        FunctionSignature::method(method.return_type),
                    )
                    .map_err(|e| e.at(identifier.span))?;
                StmtKind::AssignMethod { identifier, method }
            }
            ExType::Class => {
                let class = self.parse_class_body(scope, &identifier.value)?;
                self.scopes
                    .declare_type(scope, &identifier.value, ExType::Class)
                    .map_err(|e| e.at(identifier.span))?;
                StmtKind::AssignClass { identifier, class }
            }
            _ => {
                let expr = self.parse_expression(scope)?;
                self.scopes
                    .declare_type(scope, &identifier.value, ty)
                    .map_err(|e| e.at(identifier.span))?;
                StmtKind::AssignProperty {
                    ty,
                    identifier,
                    expr,
                }
            }
        };

        let end = self.expect_delimiter(";", SyntaxErrorKind::MissingSemicolon)?;
        Ok(Stmt {
            kind,
            scope,
            span: start.to(end.span),
        })
    }

    /// The identifier being declared by an assignment
    fn parse_identifier(&mut self) -> ParseResult<Spanned<String>> {
        match self.current() {
            Some(token) if token.kind == TokenKind::Identifier => {
                self.bump();
                Ok(Spanned::new(token.text.clone(), token.span))
            }
            _ => Err(self.error_or_eof(SyntaxErrorKind::UnexpectedToken).into()),
        }
    }

    /// `{ statements }` of a method, in a fresh child scope
    fn parse_method_body(
        &mut self,
        parent: ScopeId,
        name: &str,
    ) -> ParseResult<Method> {
        self.expect_delimiter("{", SyntaxErrorKind::MissingOpeningBrace)?;
        let scope = self.scopes.push(parent, ScopeOwner::Method(name.to_string()));

        let mut body = Vec::new();
        while !self.at_delimiter("}") {
            if self.at_end() {
                return Err(self.error(SyntaxErrorKind::MissingClosingBrace).into());
            }
            body.push(self.parse_statement(scope)?);
        }
        self.bump();

        let return_type = first_return_type(&body);
        debug!("Parsed method `{}` -> {}", name, return_type);
        Ok(Method {
            name: name.to_string(),
            scope,
            body,
            return_type,
        })
    }

    /// `{ members }` of a class, in a fresh child scope
    fn parse_class_body(
        &mut self,
        parent: ScopeId,
        name: &str,
    ) -> ParseResult<Class> {
        self.expect_delimiter("{", SyntaxErrorKind::MissingOpeningBrace)?;
        let scope = self.scopes.push(parent, ScopeOwner::Class(name.to_string()));

        let mut body = Vec::new();
        while !self.at_delimiter("}") {
            if self.at_end() {
                return Err(self.error(SyntaxErrorKind::MissingClosingBrace).into());
            }
            body.push(self.parse_class_member(scope)?);
        }
        self.bump();

        debug!("Parsed class `{}` with {} members", name, body.len());
        Ok(Class {
            name: name.to_string(),
            scope,
            body,
        })
    }

    /// `return <expr> ;`
    fn parse_return(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Stmt> {
        let start = self.span();
        self.bump();
        let expr = self.parse_expression(scope)?;
        let end = self.expect_delimiter(";", SyntaxErrorKind::MissingSemicolon)?;
        Ok(Stmt {
            kind: StmtKind::Return { expr },
            scope,
            span: start.to(end.span),
        })
    }

    /// `<callee>(<args>) ;`
    fn parse_call_statement(
        &mut self,
        scope: ScopeId,
    ) -> ParseResult<Stmt> {
        let start = self.span();
        let (call, _, _) = self.parse_call(scope)?;
        let end = self.expect_delimiter(";", SyntaxErrorKind::MissingSemicolon)?;
        Ok(Stmt {
            kind: StmtKind::MethodCall(call),
            scope,
            span: start.to(end.span),
        })
    }
}

/// Type of the first top-level `return` in a body, `void` without one
pub fn first_return_type(body: &[Stmt]) -> ExType {
    body.iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::Return { expr } => Some(expr.ty),
            _ => None,
        })
        .unwrap_or(ExType::Void)
}
