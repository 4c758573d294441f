//! Intermediate Representation
//!
//! A small SSA form: every instruction result is a fresh register, storage
//! is reached through `alloca` pointers or module globals, and control flow
//! merges through `phi`. Blocks end in exactly one terminator.

use crate::frontend::core::parser::ast::BinOp;
use crate::frontend::core::type_system::ExType;
use std::fmt;

/// SSA register, numbered per function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub usize);

/// Index of a block in its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// Index of a function in its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub usize);

/// Index of a global in its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub usize);

impl fmt::Display for Reg {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Constant value
#[derive(Debug, Clone)]
pub enum ConstValue {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl ConstValue {
    pub fn ty(&self) -> ExType {
        match self {
            ConstValue::Void => ExType::Void,
            ConstValue::Bool(_) => ExType::Bool,
            ConstValue::Int(_) => ExType::Int,
            ConstValue::Float(_) => ExType::Float,
            ConstValue::Char(_) => ExType::Char,
            ConstValue::Str(_) => ExType::Str,
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Bool(l0), Self::Bool(r0)) => l0 == r0,
            (Self::Int(l0), Self::Int(r0)) => l0 == r0,
            (Self::Float(l0), Self::Float(r0)) => l0.to_bits() == r0.to_bits(),
            (Self::Char(l0), Self::Char(r0)) => l0 == r0,
            (Self::Str(l0), Self::Str(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl fmt::Display for ConstValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConstValue::Void => f.write_str("void"),
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Int(n) => write!(f, "{}", n),
            ConstValue::Float(x) => write!(f, "{:?}", x),
            ConstValue::Char(c) => write!(f, "{:?}", c),
            ConstValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Const(ConstValue),
    Reg(Reg),
    /// Address of a module global
    Global(GlobalId),
}

/// Instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Reserve a function-local slot; `dst` holds its address
    Alloca {
        dst: Reg,
        ty: ExType,
        name: String,
    },
    Store {
        ptr: Operand,
        value: Operand,
    },
    Load {
        dst: Reg,
        ty: ExType,
        ptr: Operand,
    },
    /// `ty` is the operand type
    Binary {
        dst: Reg,
        op: BinOp,
        ty: ExType,
        lhs: Operand,
        rhs: Operand,
    },
    Call {
        dst: Option<Reg>,
        callee: FuncId,
        args: Vec<Operand>,
    },
    Phi {
        dst: Reg,
        ty: ExType,
        incoming: Vec<(Operand, BlockId)>,
    },
    Br(BlockId),
    CondBr {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret(Option<Operand>),
    Unreachable,
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Br(_)
                | Instruction::CondBr { .. }
                | Instruction::Ret(_)
                | Instruction::Unreachable
        )
    }
}

/// Basic block
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.instructions
            .last()
            .is_some_and(Instruction::is_terminator)
    }
}

/// Function IR
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionIr {
    pub name: String,
    pub params: Vec<ExType>,
    pub return_type: ExType,
    pub variadic: bool,
    /// Declared only; the body is supplied at run time
    pub external: bool,
    pub blocks: Vec<BasicBlock>,
    /// Next free register number
    pub next_reg: usize,
}

impl FunctionIr {
    pub fn block(
        &self,
        id: BlockId,
    ) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    /// Iterate all instructions
    pub fn all_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|block| block.instructions.iter())
    }
}

/// Module global
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalIr {
    pub name: String,
    pub ty: ExType,
}

/// Module IR
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleIr {
    pub name: String,
    pub globals: Vec<GlobalIr>,
    pub functions: Vec<FunctionIr>,
}

impl ModuleIr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn function(
        &self,
        id: FuncId,
    ) -> Option<&FunctionIr> {
        self.functions.get(id.0)
    }

    pub fn function_by_name(
        &self,
        name: &str,
    ) -> Option<(FuncId, &FunctionIr)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, function)| function.name == name)
            .map(|(index, function)| (FuncId(index), function))
    }

    pub fn global_by_name(
        &self,
        name: &str,
    ) -> Option<(GlobalId, &GlobalIr)> {
        self.globals
            .iter()
            .enumerate()
            .find(|(_, global)| global.name == name)
            .map(|(index, global)| (GlobalId(index), global))
    }
}

// =========================================================================
// Text form
// =========================================================================

/// IR spelling of a type
pub fn type_name(ty: ExType) -> &'static str {
    match ty {
        ExType::Int => "i64",
        ExType::Float => "double",
        ExType::Str => "str",
        ExType::Char => "char",
        ExType::Bool => "i1",
        ExType::Void => "void",
        ExType::Method | ExType::Class => "ptr",
    }
}

fn op_name(
    op: BinOp,
    ty: ExType,
) -> &'static str {
    let float = ty == ExType::Float;
    match op {
        BinOp::Add if float => "fadd",
        BinOp::Add => "add",
        BinOp::Sub if float => "fsub",
        BinOp::Sub => "sub",
        BinOp::Mul if float => "fmul",
        BinOp::Mul => "mul",
        BinOp::Div if float => "fdiv",
        BinOp::Div => "sdiv",
        BinOp::Eq => "cmp eq",
        BinOp::Neq => "cmp ne",
        BinOp::Lt => "cmp lt",
        BinOp::Le => "cmp le",
        BinOp::Gt => "cmp gt",
        BinOp::Ge => "cmp ge",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::Xor => "xor",
    }
}

/// Renders operands, blocks and callees by name
struct Printer<'m> {
    module: &'m ModuleIr,
    function: &'m FunctionIr,
}

impl Printer<'_> {
    fn operand(
        &self,
        operand: &Operand,
    ) -> String {
        match operand {
            Operand::Const(value) => value.to_string(),
            Operand::Reg(reg) => reg.to_string(),
            Operand::Global(id) => match self.module.globals.get(id.0) {
                Some(global) => format!("@{}", global.name),
                None => format!("@<global {}>", id.0),
            },
        }
    }

    fn block(
        &self,
        id: BlockId,
    ) -> String {
        match self.function.block(id) {
            Some(block) => format!("%{}", block.label),
            None => format!("%<block {}>", id.0),
        }
    }

    fn instruction(
        &self,
        f: &mut fmt::Formatter<'_>,
        instruction: &Instruction,
    ) -> fmt::Result {
        match instruction {
            Instruction::Alloca { dst, ty, name } => {
                write!(f, "{} = alloca {} ; {}", dst, type_name(*ty), name)
            }
            Instruction::Store { ptr, value } => {
                write!(f, "store {}, {}", self.operand(value), self.operand(ptr))
            }
            Instruction::Load { dst, ty, ptr } => {
                write!(f, "{} = load {}, {}", dst, type_name(*ty), self.operand(ptr))
            }
            Instruction::Binary {
                dst,
                op,
                ty,
                lhs,
                rhs,
            } => write!(
                f,
                "{} = {} {} {}, {}",
                dst,
                op_name(*op, *ty),
                type_name(*ty),
                self.operand(lhs),
                self.operand(rhs)
            ),
            Instruction::Call { dst, callee, args } => {
                let (name, ret) = match self.module.function(*callee) {
                    Some(function) => (function.name.as_str(), function.return_type),
                    None => ("<unknown>", ExType::Void),
                };
                let args = args
                    .iter()
                    .map(|arg| self.operand(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                match dst {
                    Some(dst) => write!(f, "{} = call {} @{}({})", dst, type_name(ret), name, args),
                    None => write!(f, "call {} @{}({})", type_name(ret), name, args),
                }
            }
            Instruction::Phi { dst, ty, incoming } => {
                let incoming = incoming
                    .iter()
                    .map(|(value, block)| format!("[ {}, {} ]", self.operand(value), self.block(*block)))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} = phi {} {}", dst, type_name(*ty), incoming)
            }
            Instruction::Br(target) => write!(f, "br label {}", self.block(*target)),
            Instruction::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "br i1 {}, label {}, label {}",
                self.operand(cond),
                self.block(*then_block),
                self.block(*else_block)
            ),
            Instruction::Ret(Some(value)) => write!(f, "ret {}", self.operand(value)),
            Instruction::Ret(None) => f.write_str("ret void"),
            Instruction::Unreachable => f.write_str("unreachable"),
        }
    }
}

fn signature_text(function: &FunctionIr) -> String {
    let mut params: Vec<&str> = function.params.iter().map(|ty| type_name(*ty)).collect();
    if function.variadic {
        params.push("...");
    }
    format!(
        "{} @{}({})",
        type_name(function.return_type),
        function.name,
        params.join(", ")
    )
}

impl fmt::Display for ModuleIr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for global in &self.globals {
            writeln!(f, "@{} = global {}", global.name, type_name(global.ty))?;
        }

        for function in &self.functions {
            writeln!(f)?;
            if function.external {
                writeln!(f, "declare {}", signature_text(function))?;
                continue;
            }

            writeln!(f, "define {} {{", signature_text(function))?;
            let printer = Printer {
                module: self,
                function,
            };
            for block in &function.blocks {
                writeln!(f, "{}:", block.label)?;
                for instruction in &block.instructions {
                    f.write_str("  ")?;
                    printer.instruction(f, instruction)?;
                    writeln!(f)?;
                }
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
