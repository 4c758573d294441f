//! IR Builder
//!
//! 默认后端：把 [`Backend`] 调用记录为 [`ModuleIr`]。

use super::{Backend, BackendError, BackendResult};
use crate::frontend::core::parser::ast::BinOp;
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::middle::ir::{
    BasicBlock, BlockId, ConstValue, FuncId, FunctionIr, GlobalId, GlobalIr, Instruction,
    ModuleIr, Operand, Reg,
};
use tracing::trace;

/// A block of a particular function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub function: FuncId,
    pub block: BlockId,
}

/// IR 构建器
#[derive(Debug, Clone)]
pub struct IrBuilder {
    module: ModuleIr,
    position: Option<BlockRef>,
}

impl IrBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module: ModuleIr::new(module_name),
            position: None,
        }
    }

    /// The module built so far
    pub fn module(&self) -> &ModuleIr {
        &self.module
    }

    /// Finish building and take the module
    pub fn finish(self) -> ModuleIr {
        self.module
    }

    /// `name`, or `name.N` when `taken` already holds it
    fn unique_name(
        name: &str,
        taken: impl Fn(&str) -> bool,
    ) -> String {
        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{}.{}", name, n))
            .find(|candidate| !taken(candidate.as_str()))
            .unwrap_or_else(|| name.to_string())
    }

    fn function_mut(
        &mut self,
        id: FuncId,
    ) -> &mut FunctionIr {
        &mut self.module.functions[id.0]
    }

    fn fresh_reg(&mut self) -> BackendResult<Reg> {
        let position = self.position.ok_or(BackendError::NoInsertionPoint)?;
        let function = self.function_mut(position.function);
        let reg = Reg(function.next_reg);
        function.next_reg += 1;
        Ok(reg)
    }

    fn emit(
        &mut self,
        instruction: Instruction,
    ) -> BackendResult<()> {
        let position = self.position.ok_or(BackendError::NoInsertionPoint)?;
        let block = &mut self.function_mut(position.function).blocks[position.block.0];
        if block.is_terminated() {
            return Err(BackendError::BlockTerminated(block.label.clone()));
        }
        trace!("emit {:?}", instruction);
        block.instructions.push(instruction);
        Ok(())
    }
}

impl Backend for IrBuilder {
    type Value = Operand;
    type Function = FuncId;
    type Block = BlockRef;

    fn declare_function(
        &mut self,
        name: &str,
        signature: &FunctionSignature,
    ) -> FuncId {
        let functions = &self.module.functions;
        let name = Self::unique_name(name, |candidate| {
            functions.iter().any(|function| function.name == candidate)
        });
        let id = FuncId(self.module.functions.len());
        self.module.functions.push(FunctionIr {
            name,
            params: signature.params.clone(),
            return_type: signature.return_type,
            variadic: signature.variadic,
            external: signature.builtin,
            blocks: Vec::new(),
            next_reg: 0,
        });
        id
    }

    fn append_block(
        &mut self,
        function: FuncId,
        label: &str,
    ) -> BlockRef {
        let blocks = &self.module.functions[function.0].blocks;
        let label = Self::unique_name(label, |candidate| {
            blocks.iter().any(|block| block.label == candidate)
        });
        let function_ir = self.function_mut(function);
        let block = BlockId(function_ir.blocks.len());
        function_ir.blocks.push(BasicBlock::new(label));
        BlockRef { function, block }
    }

    fn position_at_end(
        &mut self,
        block: BlockRef,
    ) {
        self.position = Some(block);
    }

    fn current_block(&self) -> Option<BlockRef> {
        self.position
    }

    fn is_terminated(
        &self,
        block: BlockRef,
    ) -> bool {
        self.module
            .function(block.function)
            .and_then(|function| function.block(block.block))
            .is_some_and(BasicBlock::is_terminated)
    }

    fn const_value(
        &mut self,
        value: ConstValue,
    ) -> Operand {
        Operand::Const(value)
    }

    fn alloca(
        &mut self,
        ty: ExType,
        name: &str,
    ) -> BackendResult<Operand> {
        let dst = self.fresh_reg()?;
        self.emit(Instruction::Alloca {
            dst,
            ty,
            name: name.to_string(),
        })?;
        Ok(Operand::Reg(dst))
    }

    fn global(
        &mut self,
        ty: ExType,
        name: &str,
    ) -> Operand {
        let globals = &self.module.globals;
        let name = Self::unique_name(name, |candidate| {
            globals.iter().any(|global| global.name == candidate)
        });
        let id = GlobalId(self.module.globals.len());
        self.module.globals.push(GlobalIr { name, ty });
        Operand::Global(id)
    }

    fn store(
        &mut self,
        ptr: &Operand,
        value: &Operand,
    ) -> BackendResult<()> {
        self.emit(Instruction::Store {
            ptr: ptr.clone(),
            value: value.clone(),
        })
    }

    fn load(
        &mut self,
        ty: ExType,
        ptr: &Operand,
    ) -> BackendResult<Operand> {
        let dst = self.fresh_reg()?;
        self.emit(Instruction::Load {
            dst,
            ty,
            ptr: ptr.clone(),
        })?;
        Ok(Operand::Reg(dst))
    }

    fn binary(
        &mut self,
        op: BinOp,
        ty: ExType,
        lhs: &Operand,
        rhs: &Operand,
    ) -> BackendResult<Operand> {
        let dst = self.fresh_reg()?;
        self.emit(Instruction::Binary {
            dst,
            op,
            ty,
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        })?;
        Ok(Operand::Reg(dst))
    }

    fn call(
        &mut self,
        function: FuncId,
        args: &[Operand],
    ) -> BackendResult<Operand> {
        let returns_void = self
            .module
            .function(function)
            .is_none_or(|callee| callee.return_type == ExType::Void);
        let dst = if returns_void {
            None
        } else {
            Some(self.fresh_reg()?)
        };
        self.emit(Instruction::Call {
            dst,
            callee: function,
            args: args.to_vec(),
        })?;
        Ok(dst.map_or(Operand::Const(ConstValue::Void), Operand::Reg))
    }

    fn branch(
        &mut self,
        target: BlockRef,
    ) -> BackendResult<()> {
        self.emit(Instruction::Br(target.block))
    }

    fn cond_branch(
        &mut self,
        cond: &Operand,
        then_block: BlockRef,
        else_block: BlockRef,
    ) -> BackendResult<()> {
        self.emit(Instruction::CondBr {
            cond: cond.clone(),
            then_block: then_block.block,
            else_block: else_block.block,
        })
    }

    fn phi(
        &mut self,
        ty: ExType,
        incoming: &[(Operand, BlockRef)],
    ) -> BackendResult<Operand> {
        let dst = self.fresh_reg()?;
        self.emit(Instruction::Phi {
            dst,
            ty,
            incoming: incoming
                .iter()
                .map(|(value, block)| (value.clone(), block.block))
                .collect(),
        })?;
        Ok(Operand::Reg(dst))
    }

    fn ret(
        &mut self,
        value: Option<&Operand>,
    ) -> BackendResult<()> {
        self.emit(Instruction::Ret(value.cloned()))
    }

    fn unreachable(&mut self) -> BackendResult<()> {
        self.emit(Instruction::Unreachable)
    }
}
