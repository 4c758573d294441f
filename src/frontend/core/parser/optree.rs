//! Optree folding
//!
//! The parser collects a chain of operands and operators flat, then folds
//! it into a tree by binding power. Operators of equal power associate to
//! the left.

use super::ast::{BinOp, Expr, ExprKind};
use std::iter::Peekable;

/// Binding power levels, higher binds tighter
pub const BP_OR: u8 = 1;
pub const BP_XOR: u8 = 2;
pub const BP_AND: u8 = 3;
pub const BP_EQ: u8 = 4;
pub const BP_CMP: u8 = 5;
pub const BP_ADD: u8 = 6;
pub const BP_MUL: u8 = 7;

/// Binding power of a binary operator
pub fn binding_power(op: BinOp) -> u8 {
    match op {
        BinOp::Mul | BinOp::Div => BP_MUL,
        BinOp::Add | BinOp::Sub => BP_ADD,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => BP_CMP,
        BinOp::Eq | BinOp::Neq => BP_EQ,
        BinOp::And => BP_AND,
        BinOp::Xor => BP_XOR,
        BinOp::Or => BP_OR,
    }
}

/// Fold `first op1 e1 op2 e2 ...` into a binary tree
pub fn fold_optree(
    first: Expr,
    rest: Vec<(BinOp, Expr)>,
) -> Expr {
    let mut rest = rest.into_iter().peekable();
    climb(first, &mut rest, 0)
}

fn next_op<I>(rest: &mut Peekable<I>) -> Option<BinOp>
where
    I: Iterator<Item = (BinOp, Expr)>,
{
    rest.peek().map(|(op, _)| *op)
}

fn climb<I>(
    mut lhs: Expr,
    rest: &mut Peekable<I>,
    min_bp: u8,
) -> Expr
where
    I: Iterator<Item = (BinOp, Expr)>,
{
    while let Some(op) = next_op(rest).filter(|op| binding_power(*op) >= min_bp) {
        let Some((_, mut rhs)) = rest.next() else {
            break;
        };
        while let Some(next) = next_op(rest).filter(|next| binding_power(*next) > binding_power(op)) {
            rhs = climb(rhs, rest, binding_power(next));
        }
        lhs = binary(op, lhs, rhs);
    }
    lhs
}

fn binary(
    op: BinOp,
    lhs: Expr,
    rhs: Expr,
) -> Expr {
    Expr {
        ty: op.result_type(lhs.ty),
        span: lhs.span.to(rhs.span),
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
    }
}
