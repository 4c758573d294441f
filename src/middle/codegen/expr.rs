//! Expression generation

use super::{expect_type, Backend, BackendError, CodegenContext, CodegenError, CodegenResult};
use crate::frontend::core::parser::ast::{BinOp, Call, Expr, ExprKind, LiteralKind};
use crate::frontend::core::scope::ScopeId;
use crate::frontend::core::type_system::ExType;
use crate::middle::ir::ConstValue;
use crate::util::span::Span;
use tracing::trace;

/// Parse the raw text of a literal token
pub fn literal_value(
    kind: LiteralKind,
    raw: &str,
    span: Span,
) -> CodegenResult<ConstValue> {
    let invalid = || CodegenError::InvalidLiteral {
        raw: raw.to_string(),
        span,
    };
    let quoted = |quote: char| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .ok_or_else(invalid)
    };

    match kind {
        LiteralKind::Integer => raw.parse().map(ConstValue::Int).map_err(|_| invalid()),
        LiteralKind::Float => raw.parse().map(ConstValue::Float).map_err(|_| invalid()),
        LiteralKind::String => quoted('"').map(|text| ConstValue::Str(text.to_string())),
        LiteralKind::Character => {
            let text = quoted('\'')?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(ConstValue::Char(c)),
                _ => Err(invalid()),
            }
        }
        LiteralKind::Boolean => match raw {
            "True" => Ok(ConstValue::Bool(true)),
            "False" => Ok(ConstValue::Bool(false)),
            _ => Err(invalid()),
        },
    }
}

/// Operand checks for `lhs op rhs`
pub fn check_binary(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
) -> CodegenResult<()> {
    let admits = |ty: ExType| {
        if op.is_arithmetic() {
            ty.is_numeric()
        } else if op.is_relational() {
            ty.is_ordered()
        } else if op.is_boolean() {
            ty == ExType::Bool
        } else {
            true
        }
    };

    if !admits(lhs.ty) {
        let expected = if op.is_boolean() {
            ExType::Bool
        } else {
            ExType::Int
        };
        return Err(CodegenError::TypeMismatch {
            expected,
            found: lhs.ty,
            span: lhs.span,
        });
    }
    expect_type(lhs.ty, rhs.ty, rhs.span)
}

impl<B: Backend> CodegenContext<'_, B> {
    /// Generate an expression evaluated in `scope`
    pub fn gen_expr(
        &mut self,
        scope: ScopeId,
        expr: &Expr,
    ) -> CodegenResult<B::Value> {
        match &expr.kind {
            ExprKind::Literal { kind, raw } => {
                let value = literal_value(*kind, raw, expr.span)?;
                Ok(self.backend.const_value(value))
            }
            ExprKind::Identifier(name) => self.gen_identifier(scope, name, expr),
            ExprKind::Binary {
                op: op @ (BinOp::And | BinOp::Or),
                lhs,
                rhs,
            } => self.gen_short_circuit(scope, *op, lhs, rhs),
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_value = self.gen_expr(scope, lhs)?;
                let rhs_value = self.gen_expr(scope, rhs)?;
                check_binary(*op, lhs, rhs)?;
                Ok(self.backend.binary(*op, lhs.ty, &lhs_value, &rhs_value)?)
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => self.gen_ternary(scope, condition, then_branch, else_branch),
            ExprKind::Call(call) => self.gen_call(scope, call, expr.span),
        }
    }

    /// Reuse the bound value inside its own function, reload globals
    /// elsewhere
    fn gen_identifier(
        &mut self,
        scope: ScopeId,
        name: &str,
        expr: &Expr,
    ) -> CodegenResult<B::Value> {
        let current = self.current_function();
        let scopes = self.scopes;
        let binding = self
            .values
            .lookup_value(scopes, scope, name)
            .map_err(|e| e.at(expr.span))?;

        if Some(binding.function) == current {
            trace!("`{}` reuses its bound value", name);
            Ok(binding.loaded.clone())
        } else if binding.global {
            let slot = binding.slot.clone();
            trace!("`{}` reloads from its global", name);
            Ok(self.backend.load(expr.ty, &slot)?)
        } else {
            Err(CodegenError::UnsupportedCapture {
                name: name.to_string(),
                span: expr.span,
            })
        }
    }

    /// Conditional branch into two arms merged by a phi
    fn gen_ternary(
        &mut self,
        scope: ScopeId,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> CodegenResult<B::Value> {
        let cond = self.gen_expr(scope, condition)?;
        expect_type(ExType::Bool, condition.ty, condition.span)?;

        let function = self
            .current_function()
            .ok_or(BackendError::NoInsertionPoint)?;
        let then_block = self.backend.append_block(function, "ternary_then");
        let else_block = self.backend.append_block(function, "ternary_else");
        let merge_block = self.backend.append_block(function, "ternary_merge");
        self.backend.cond_branch(&cond, then_block, else_block)?;

        self.backend.position_at_end(then_block);
        let then_value = self.gen_expr(scope, then_branch)?;
        let then_end = self.current_block()?;
        self.backend.branch(merge_block)?;

        self.backend.position_at_end(else_block);
        let else_value = self.gen_expr(scope, else_branch)?;
        let else_end = self.current_block()?;
        self.backend.branch(merge_block)?;

        expect_type(then_branch.ty, else_branch.ty, else_branch.span)?;

        self.backend.position_at_end(merge_block);
        Ok(self.backend.phi(
            then_branch.ty,
            &[(then_value, then_end), (else_value, else_end)],
        )?)
    }

    /// `&&` and `||`: the right operand runs only when the left one does
    /// not decide the result
    fn gen_short_circuit(
        &mut self,
        scope: ScopeId,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> CodegenResult<B::Value> {
        let lhs_value = self.gen_expr(scope, lhs)?;
        let lhs_end = self.current_block()?;

        let function = self
            .current_function()
            .ok_or(BackendError::NoInsertionPoint)?;
        let rhs_block = self.backend.append_block(function, "logic_rhs");
        let merge_block = self.backend.append_block(function, "logic_merge");
        let decided = op == BinOp::Or;
        if decided {
            self.backend.cond_branch(&lhs_value, merge_block, rhs_block)?;
        } else {
            self.backend.cond_branch(&lhs_value, rhs_block, merge_block)?;
        }

        self.backend.position_at_end(rhs_block);
        let rhs_value = self.gen_expr(scope, rhs)?;
        let rhs_end = self.current_block()?;
        self.backend.branch(merge_block)?;

        check_binary(op, lhs, rhs)?;

        self.backend.position_at_end(merge_block);
        let short = self.backend.const_value(ConstValue::Bool(decided));
        Ok(self
            .backend
            .phi(ExType::Bool, &[(short, lhs_end), (rhs_value, rhs_end)])?)
    }

    fn current_block(&self) -> CodegenResult<B::Block> {
        self.backend
            .current_block()
            .ok_or(CodegenError::Backend(BackendError::NoInsertionPoint))
    }

    /// Check arguments against the callee's signature and emit the call
    pub(crate) fn gen_call(
        &mut self,
        scope: ScopeId,
        call: &Call,
        span: Span,
    ) -> CodegenResult<B::Value> {
        let name = &call.callee.value;
        let scopes = self.scopes;
        let signature = scopes
            .lookup_function_signature(scope, name)
            .map_err(|e| e.at(call.callee.span))?;

        let arity_ok = if signature.variadic {
            call.args.len() >= signature.params.len()
        } else {
            call.args.len() == signature.params.len()
        };
        if !arity_ok {
            return Err(CodegenError::ArityMismatch {
                name: name.clone(),
                expected: signature.params.len(),
                found: call.args.len(),
                span,
            });
        }

        let mut args = Vec::with_capacity(call.args.len());
        for (index, arg) in call.args.iter().enumerate() {
            let value = self.gen_expr(scope, arg)?;
            match signature.params.get(index) {
                Some(&param) => expect_type(param, arg.ty, arg.span)?,
                None if !arg.ty.is_storable() => {
                    return Err(CodegenError::VoidValue { span: arg.span })
                }
                None => {}
            }
            args.push(value);
        }

        let function = if signature.builtin {
            match self.externals.get(name) {
                Some(&function) => function,
                None => {
                    let function = self.backend.declare_function(name, signature);
                    self.externals.insert(name.clone(), function);
                    function
                }
            }
        } else {
            *self
                .methods
                .lookup_value(scopes, scope, name)
                .map_err(|e| e.at(call.callee.span))?
        };

        trace!("Calling `{}` with {} argument(s)", name, args.len());
        Ok(self.backend.call(function, &args)?)
    }
}
