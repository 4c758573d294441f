//! Statement generation

use super::{
    expect_type, Backend, BackendError, Binding, CodegenContext, CodegenError, CodegenResult,
};
use crate::frontend::core::parser::ast::{Class, Expr, Method, Stmt, StmtKind};
use crate::frontend::core::scope::ScopeId;
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::util::Spanned;
use tracing::{debug, trace};

impl<B: Backend> CodegenContext<'_, B> {
    /// Generate one statement
    pub fn gen_stmt(
        &mut self,
        stmt: &Stmt,
    ) -> CodegenResult<()> {
        trace!("Generating statement at {}", stmt.span);
        match &stmt.kind {
            StmtKind::AssignProperty {
                ty,
                identifier,
                expr,
            } => self.gen_assign_property(stmt.scope, *ty, identifier, expr),
            StmtKind::AssignMethod { identifier, method } => {
                self.gen_assign_method(stmt.scope, identifier, method)
            }
            StmtKind::AssignClass { identifier, class } => self.gen_assign_class(identifier, class),
            StmtKind::Return { expr } => self.gen_return(stmt.scope, expr),
            StmtKind::MethodCall(call) => {
                self.gen_call(stmt.scope, call, stmt.span)?;
                Ok(())
            }
        }
    }

    /// Evaluate, check, store into fresh storage, load back and bind
    fn gen_assign_property(
        &mut self,
        scope: ScopeId,
        ty: ExType,
        identifier: &Spanned<String>,
        expr: &Expr,
    ) -> CodegenResult<()> {
        let value = self.gen_expr(scope, expr)?;
        expect_type(ty, expr.ty, expr.span)?;
        if !ty.is_storable() {
            return Err(CodegenError::VoidValue { span: expr.span });
        }

        let function = self
            .current_function()
            .ok_or(CodegenError::Backend(BackendError::NoInsertionPoint))?;
        let global = self.is_global_scope(scope);
        let slot = if global {
            let name = self.qualified_name(&identifier.value);
            self.backend.global(ty, &name)
        } else {
            self.backend.alloca(ty, &identifier.value)?
        };

        self.backend.store(&slot, &value)?;
        let loaded = self.backend.load(ty, &slot)?;
        self.values.bind_value(
            scope,
            &identifier.value,
            Binding {
                slot,
                loaded,
                function,
                global,
            },
        );
        trace!("Bound `{}: {}` (global: {})", identifier.value, ty, global);
        Ok(())
    }

    /// Emit a method as its own function
    fn gen_assign_method(
        &mut self,
        scope: ScopeId,
        identifier: &Spanned<String>,
        method: &Method,
    ) -> CodegenResult<()> {
        let name = self.qualified_name(&identifier.value);
        let function = self.backend.declare_function(
            &name,
            &FunctionSignature::method(method.return_type),
        );
        self.methods.bind_value(scope, &identifier.value, function);

        self.path.push(identifier.value.clone());
        let result = self.gen_function_body(function, method.return_type, &method.body);
        self.path.pop();
        result?;

        debug!("Generated method `{}`", name);
        Ok(())
    }

    /// Emit class members inline: methods as `Class.method` functions,
    /// properties as globals
    fn gen_assign_class(
        &mut self,
        identifier: &Spanned<String>,
        class: &Class,
    ) -> CodegenResult<()> {
        self.path.push(identifier.value.clone());
        let result = class.body.iter().try_for_each(|member| self.gen_stmt(member));
        self.path.pop();
        result?;

        debug!("Generated class `{}`", class.name);
        Ok(())
    }

    /// Emit `ret` and continue in an unreachable block
    fn gen_return(
        &mut self,
        scope: ScopeId,
        expr: &Expr,
    ) -> CodegenResult<()> {
        let (function, return_type) = self
            .frame
            .as_ref()
            .map(|frame| (frame.function, frame.return_type))
            .ok_or(CodegenError::Backend(BackendError::NoInsertionPoint))?;

        let value = self.gen_expr(scope, expr)?;
        expect_type(return_type, expr.ty, expr.span)?;

        if expr.ty == ExType::Void {
            self.backend.ret(None)?;
        } else {
            self.backend.ret(Some(&value))?;
        }

        let after = self.backend.append_block(function, "after_return");
        self.backend.position_at_end(after);
        Ok(())
    }
}
