//! Abstract Syntax Tree types
//!
//! The tree is plain data: no backend handles. Every expression carries
//! the type it resolved to at construction and every statement records the
//! scope it was built in.
//!
//! `Display` renders a span-free S-expression form used by the CLI and by
//! tests that compare trees built from differently formatted sources.

use crate::frontend::core::lexer::TokenKind;
use crate::frontend::core::scope::{ScopeId, ScopeTree};
use crate::frontend::core::type_system::ExType;
use crate::util::span::Span;
use crate::util::Spanned;
use std::fmt;

/// Kind of a literal expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Character,
    Boolean,
}

impl LiteralKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::IntegerLiteral => Some(LiteralKind::Integer),
            TokenKind::FloatLiteral => Some(LiteralKind::Float),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            TokenKind::CharacterLiteral => Some(LiteralKind::Character),
            TokenKind::BooleanLiteral => Some(LiteralKind::Boolean),
            _ => None,
        }
    }

    pub fn ty(self) -> ExType {
        match self {
            LiteralKind::Integer => ExType::Int,
            LiteralKind::Float => ExType::Float,
            LiteralKind::String => ExType::Str,
            LiteralKind::Character => ExType::Char,
            LiteralKind::Boolean => ExType::Bool,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
}

impl BinOp {
    /// Operator for the text of an operator-class token
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "==" => Some(BinOp::Eq),
            "!=" => Some(BinOp::Neq),
            "<" => Some(BinOp::Lt),
            "<=" => Some(BinOp::Le),
            ">" => Some(BinOp::Gt),
            ">=" => Some(BinOp::Ge),
            "&&" => Some(BinOp::And),
            "||" => Some(BinOp::Or),
            "^" => Some(BinOp::Xor),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Xor => "^",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Neq)
    }

    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or | BinOp::Xor)
    }

    /// Type of `lhs op rhs` given the left operand's type
    pub fn result_type(
        self,
        lhs: ExType,
    ) -> ExType {
        if self.is_arithmetic() {
            lhs
        } else {
            ExType::Bool
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A method call, as a statement or as an expression
#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Spanned<String>,
    pub args: Vec<Expr>,
}

/// Expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: ExType,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal {
        kind: LiteralKind,
        raw: String,
    },
    Identifier(String),
    /// A folded optree node
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Method call whose value is captured
    Call(Call),
}

/// Statement
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub scope: ScopeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    AssignProperty {
        ty: ExType,
        identifier: Spanned<String>,
        expr: Expr,
    },
    AssignMethod {
        identifier: Spanned<String>,
        method: Method,
    },
    AssignClass {
        identifier: Spanned<String>,
        class: Class,
    },
    Return {
        expr: Expr,
    },
    /// Method call whose value is discarded
    MethodCall(Call),
}

/// Method body: its own scope and statements
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub scope: ScopeId,
    pub body: Vec<Stmt>,
    /// Type of the first top-level `return`, `void` without one
    pub return_type: ExType,
}

/// Class body: methods, nested classes and properties
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub scope: ScopeId,
    pub body: Vec<Stmt>,
}

/// A parsed compilation unit
#[derive(Debug, Clone)]
pub struct Program {
    pub root: Method,
    pub scopes: ScopeTree,
}

// =========================================================================
// S-expression rendering
// =========================================================================

impl fmt::Display for Expr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal { raw, .. } => f.write_str(raw),
            ExprKind::Identifier(name) => f.write_str(name),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({} {} {})", op, lhs, rhs),
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(? {} {} {})", condition, then_branch, else_branch),
            ExprKind::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "(call {}", self.callee.value)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        f.write_str(")")
    }
}

fn write_body(
    f: &mut fmt::Formatter<'_>,
    body: &[Stmt],
    indent: usize,
) -> fmt::Result {
    for stmt in body {
        write_stmt(f, stmt, indent)?;
    }
    Ok(())
}

fn write_stmt(
    f: &mut fmt::Formatter<'_>,
    stmt: &Stmt,
    indent: usize,
) -> fmt::Result {
    let pad = "  ".repeat(indent);
    match &stmt.kind {
        StmtKind::AssignProperty {
            ty,
            identifier,
            expr,
        } => writeln!(f, "{}({} {} {})", pad, ty, identifier.value, expr),
        StmtKind::AssignMethod { identifier, method } => {
            writeln!(f, "{}(method {} -> {}", pad, identifier.value, method.return_type)?;
            write_body(f, &method.body, indent + 1)?;
            writeln!(f, "{})", pad)
        }
        StmtKind::AssignClass { identifier, class } => {
            writeln!(f, "{}(class {}", pad, identifier.value)?;
            write_body(f, &class.body, indent + 1)?;
            writeln!(f, "{})", pad)
        }
        StmtKind::Return { expr } => writeln!(f, "{}(return {})", pad, expr),
        StmtKind::MethodCall(call) => writeln!(f, "{}{}", pad, call),
    }
}

impl fmt::Display for Stmt {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write_body(f, &self.root.body, 0)
    }
}
