//! Virtual Machine executor
//!
//! 解释执行 [`ModuleIr`]：按基本块顺序执行指令，`phi` 依据前驱块取值，
//! 全局变量与 `alloca` 槽位分别保存在模块与调用帧中。

use crate::frontend::core::parser::ast::BinOp;
use crate::middle::ir::{BlockId, ConstValue, FuncId, FunctionIr, Instruction, ModuleIr, Operand, Reg};
use crate::vm::errors::{VmError, VmResult};
use crate::vm::extfunc::{IoContext, EXTERNAL_FUNCTIONS};
use std::fmt;
use tracing::{debug, trace};

/// VM 配置
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// 最大调用深度
    pub max_call_depth: usize,
    /// 输出同时写到 stdout
    pub echo_stdout: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 1024,
            echo_stdout: false,
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
        }
    }

    fn as_bool(&self) -> VmResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(VmError::TypeError(format!(
                "expected bool, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<&ConstValue> for Value {
    fn from(value: &ConstValue) -> Self {
        match value {
            ConstValue::Void => Value::Void,
            ConstValue::Bool(b) => Value::Bool(*b),
            ConstValue::Int(n) => Value::Int(*n),
            ConstValue::Float(x) => Value::Float(*x),
            ConstValue::Char(c) => Value::Char(*c),
            ConstValue::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Void => f.write_str("()"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Storage address held in a register
#[derive(Debug, Clone, Copy, PartialEq)]
enum Address {
    Global(usize),
    Local(usize),
}

/// Register contents
#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    Address(Address),
}

/// 调用帧
struct Frame<'m> {
    function: &'m FunctionIr,
    regs: Vec<Option<Slot>>,
    locals: Vec<Option<Value>>,
}

impl<'m> Frame<'m> {
    fn new(function: &'m FunctionIr) -> Self {
        Self {
            function,
            regs: vec![None; function.next_reg],
            locals: Vec::new(),
        }
    }

    fn reg(
        &self,
        reg: Reg,
    ) -> VmResult<&Slot> {
        self.regs
            .get(reg.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| VmError::UninitializedSlot(format!("{} in `{}`", reg, self.function.name)))
    }

    fn set(
        &mut self,
        reg: Reg,
        slot: Slot,
    ) {
        if reg.0 >= self.regs.len() {
            self.regs.resize(reg.0 + 1, None);
        }
        self.regs[reg.0] = Some(slot);
    }
}

/// 虚拟机
pub struct Vm<'m> {
    module: &'m ModuleIr,
    config: VmConfig,
    globals: Vec<Option<Value>>,
    io: IoContext,
    depth: usize,
}

impl<'m> Vm<'m> {
    pub fn new(module: &'m ModuleIr) -> Self {
        Self::with_config(module, VmConfig::default())
    }

    pub fn with_config(
        module: &'m ModuleIr,
        config: VmConfig,
    ) -> Self {
        let io = IoContext {
            echo: config.echo_stdout,
            ..IoContext::default()
        };
        Self {
            module,
            globals: vec![None; module.globals.len()],
            config,
            io,
            depth: 0,
        }
    }

    /// Queue lines for `input`
    pub fn with_input<I, S>(
        mut self,
        lines: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.io.input.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Everything printed so far
    pub fn output(&self) -> &str {
        &self.io.output
    }

    /// Run the function named `entry` and return its result
    pub fn run(
        &mut self,
        entry: &str,
    ) -> VmResult<Value> {
        let (id, _) = self
            .module
            .function_by_name(entry)
            .ok_or_else(|| VmError::MissingEntry(entry.to_string()))?;
        debug!("Running `{}` in module `{}`", entry, self.module.name);
        self.call(id, Vec::new())
    }

    fn call(
        &mut self,
        id: FuncId,
        args: Vec<Value>,
    ) -> VmResult<Value> {
        let module = self.module;
        let function = module
            .function(id)
            .ok_or_else(|| VmError::UnknownFunction(format!("#{}", id.0)))?;

        if function.external {
            let external = EXTERNAL_FUNCTIONS
                .get(&function.name)
                .ok_or_else(|| VmError::UnknownExternal(function.name.clone()))?;
            trace!("External call `{}`", function.name);
            return (external.func)(&mut self.io, &args);
        }

        if self.depth >= self.config.max_call_depth {
            return Err(VmError::CallDepthExceeded(self.config.max_call_depth));
        }
        self.depth += 1;
        let result = self.execute(function);
        self.depth -= 1;
        result
    }

    fn execute(
        &mut self,
        function: &'m FunctionIr,
    ) -> VmResult<Value> {
        trace!("Entering `{}`", function.name);
        let mut frame = Frame::new(function);
        let mut current = BlockId(0);
        let mut predecessor: Option<BlockId> = None;

        'blocks: loop {
            let block = function
                .block(current)
                .ok_or_else(|| VmError::Unreachable(function.name.clone()))?;

            for instruction in &block.instructions {
                match instruction {
                    Instruction::Alloca { dst, .. } => {
                        let index = frame.locals.len();
                        frame.locals.push(None);
                        frame.set(*dst, Slot::Address(Address::Local(index)));
                    }
                    Instruction::Store { ptr, value } => {
                        let address = self.address(&frame, ptr)?;
                        let value = self.value(&frame, value)?;
                        self.store(&mut frame, address, value);
                    }
                    Instruction::Load { dst, ptr, .. } => {
                        let address = self.address(&frame, ptr)?;
                        let value = self.load(&frame, address)?;
                        frame.set(*dst, Slot::Value(value));
                    }
                    Instruction::Binary {
                        dst, op, lhs, rhs, ..
                    } => {
                        let lhs = self.value(&frame, lhs)?;
                        let rhs = self.value(&frame, rhs)?;
                        frame.set(*dst, Slot::Value(eval_binary(*op, lhs, rhs)?));
                    }
                    Instruction::Call { dst, callee, args } => {
                        let args = args
                            .iter()
                            .map(|arg| self.value(&frame, arg))
                            .collect::<VmResult<Vec<_>>>()?;
                        let result = self.call(*callee, args)?;
                        if let Some(dst) = dst {
                            frame.set(*dst, Slot::Value(result));
                        }
                    }
                    Instruction::Phi { dst, incoming, .. } => {
                        let (operand, _) = incoming
                            .iter()
                            .find(|(_, block)| Some(*block) == predecessor)
                            .ok_or_else(|| {
                                VmError::TypeError(format!(
                                    "phi in `{}` has no value for its predecessor",
                                    block.label
                                ))
                            })?;
                        let value = self.value(&frame, operand)?;
                        frame.set(*dst, Slot::Value(value));
                    }
                    Instruction::Br(target) => {
                        predecessor = Some(current);
                        current = *target;
                        continue 'blocks;
                    }
                    Instruction::CondBr {
                        cond,
                        then_block,
                        else_block,
                    } => {
                        let taken = self.value(&frame, cond)?.as_bool()?;
                        predecessor = Some(current);
                        current = if taken { *then_block } else { *else_block };
                        continue 'blocks;
                    }
                    Instruction::Ret(value) => {
                        let result = match value {
                            Some(operand) => self.value(&frame, operand)?,
                            None => Value::Void,
                        };
                        trace!("`{}` returned {:?}", function.name, result);
                        return Ok(result);
                    }
                    Instruction::Unreachable => {
                        return Err(VmError::Unreachable(function.name.clone()));
                    }
                }
            }

            // a block without a terminator
            return Err(VmError::Unreachable(function.name.clone()));
        }
    }

    fn value(
        &self,
        frame: &Frame<'_>,
        operand: &Operand,
    ) -> VmResult<Value> {
        match operand {
            Operand::Const(value) => Ok(Value::from(value)),
            Operand::Reg(reg) => match frame.reg(*reg)? {
                Slot::Value(value) => Ok(value.clone()),
                Slot::Address(_) => Err(VmError::TypeError(format!(
                    "{} holds an address, not a value",
                    reg
                ))),
            },
            Operand::Global(id) => Err(VmError::TypeError(format!(
                "global #{} used as a value",
                id.0
            ))),
        }
    }

    fn address(
        &self,
        frame: &Frame<'_>,
        operand: &Operand,
    ) -> VmResult<Address> {
        match operand {
            Operand::Global(id) if id.0 < self.globals.len() => Ok(Address::Global(id.0)),
            Operand::Global(id) => Err(VmError::UninitializedSlot(format!("global #{}", id.0))),
            Operand::Reg(reg) => match frame.reg(*reg)? {
                Slot::Address(address) => Ok(*address),
                Slot::Value(_) => Err(VmError::TypeError(format!("{} is not an address", reg))),
            },
            Operand::Const(value) => Err(VmError::TypeError(format!(
                "constant {} used as an address",
                value
            ))),
        }
    }

    fn store(
        &mut self,
        frame: &mut Frame<'_>,
        address: Address,
        value: Value,
    ) {
        match address {
            Address::Global(index) => self.globals[index] = Some(value),
            Address::Local(index) => frame.locals[index] = Some(value),
        }
    }

    fn load(
        &self,
        frame: &Frame<'_>,
        address: Address,
    ) -> VmResult<Value> {
        let (slot, name) = match address {
            Address::Global(index) => (
                self.globals.get(index),
                self.module
                    .globals
                    .get(index)
                    .map_or_else(|| format!("global #{}", index), |g| format!("@{}", g.name)),
            ),
            Address::Local(index) => (
                frame.locals.get(index),
                format!("local #{} in `{}`", index, frame.function.name),
            ),
        };
        slot.cloned()
            .flatten()
            .ok_or(VmError::UninitializedSlot(name))
    }
}

fn type_error(
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
) -> VmError {
    VmError::TypeError(format!(
        "cannot apply `{}` to {} and {}",
        op,
        lhs.type_name(),
        rhs.type_name()
    ))
}

/// Evaluate `lhs op rhs`
pub(crate) fn eval_binary(
    op: BinOp,
    lhs: Value,
    rhs: Value,
) -> VmResult<Value> {
    use std::cmp::Ordering;

    if op.is_equality() {
        if std::mem::discriminant(&lhs) != std::mem::discriminant(&rhs) {
            return Err(type_error(op, &lhs, &rhs));
        }
        let equal = lhs == rhs;
        return Ok(Value::Bool(if op == BinOp::Eq { equal } else { !equal }));
    }

    if op.is_relational() {
        let ordering = match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            _ => return Err(type_error(op, &lhs, &rhs)),
        };
        let result = match (op, ordering) {
            (_, None) => false,
            (BinOp::Lt, Some(o)) => o == Ordering::Less,
            (BinOp::Le, Some(o)) => o != Ordering::Greater,
            (BinOp::Gt, Some(o)) => o == Ordering::Greater,
            (_, Some(o)) => o != Ordering::Less,
        };
        return Ok(Value::Bool(result));
    }

    match (op, &lhs, &rhs) {
        (BinOp::Add, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
        (BinOp::Div, Value::Int(_), Value::Int(0)) => Err(VmError::DivisionByZero),
        (BinOp::Div, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(*b))),
        (BinOp::Add, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (BinOp::Sub, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
        (BinOp::Mul, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
        (BinOp::Div, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
        (BinOp::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        (BinOp::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
        (BinOp::Xor, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),
        _ => Err(type_error(op, &lhs, &rhs)),
    }
}
