//! 外部函数注册表
//!
//! 内建函数 `print`、`println`、`input` 在 VM 中的实现。

use crate::vm::errors::VmResult;
use crate::vm::executor::Value;
use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};

/// I/O seen by external functions
#[derive(Debug, Clone, Default)]
pub struct IoContext {
    /// Everything printed so far
    pub output: String,
    /// Lines handed to `input`
    pub input: VecDeque<String>,
    /// Also write output to stdout, and read stdin once `input` runs dry
    pub echo: bool,
}

impl IoContext {
    fn write(
        &mut self,
        text: &str,
    ) {
        self.output.push_str(text);
        if self.echo {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }

    fn read_line(&mut self) -> String {
        if let Some(line) = self.input.pop_front() {
            return line;
        }
        if !self.echo {
            return String::new();
        }
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        line.trim_end_matches(['\r', '\n']).to_string()
    }
}

/// 外部函数定义
pub struct ExternalFunction {
    /// 函数名
    pub name: &'static str,
    /// Rust 函数指针
    pub func: fn(&mut IoContext, &[Value]) -> VmResult<Value>,
}

/// 外部函数注册表
pub static EXTERNAL_FUNCTIONS: Lazy<ExternalFunctionRegistry> = Lazy::new(|| {
    let mut registry = ExternalFunctionRegistry::new();
    registry.init_builtins();
    registry
});

/// 外部函数注册表类型
#[derive(Default)]
pub struct ExternalFunctionRegistry {
    functions: HashMap<&'static str, ExternalFunction>,
}

impl ExternalFunctionRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// 注册外部函数
    pub fn register(
        &mut self,
        func: ExternalFunction,
    ) {
        self.functions.insert(func.name, func);
    }

    /// 获取外部函数
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&ExternalFunction> {
        self.functions.get(name)
    }

    fn init_builtins(&mut self) {
        self.register(ExternalFunction {
            name: "print",
            func: ext_print,
        });
        self.register(ExternalFunction {
            name: "println",
            func: ext_println,
        });
        self.register(ExternalFunction {
            name: "input",
            func: ext_input,
        });
    }
}

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn ext_print(
    io: &mut IoContext,
    args: &[Value],
) -> VmResult<Value> {
    io.write(&join_args(args));
    Ok(Value::Void)
}

fn ext_println(
    io: &mut IoContext,
    args: &[Value],
) -> VmResult<Value> {
    let mut line = join_args(args);
    line.push('\n');
    io.write(&line);
    Ok(Value::Void)
}

fn ext_input(
    io: &mut IoContext,
    _args: &[Value],
) -> VmResult<Value> {
    Ok(Value::Str(io.read_line()))
}
