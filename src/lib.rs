//! Sapling Programming Language
//!
//! A small typed, C-like imperative language: typed properties, nested
//! methods and classes, chained operators, ternaries and calls.
//!
//! # Example
//!
//! ```
//! use sapling::{run, vm::Value};
//!
//! let outcome = run("int x = 2; println(x * 21); return x + 1;").unwrap();
//! assert_eq!(outcome.output, "42\n");
//! assert_eq!(outcome.value, Value::Int(3));
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;
pub mod middle;
pub mod vm;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use frontend::{CompileConfig, CompileError, Compiler};
pub use middle::ModuleIr;

use std::fs;
use std::path::Path;
use tracing::{debug, info};
use vm::{Value, Vm, VmConfig};

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language name
pub const NAME: &str = "Sapling";

/// Result of running a program
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Value returned by the entry function
    pub value: Value,
    /// Everything the program printed
    pub output: String,
}

/// Compile source code to an IR module with the default configuration
pub fn compile_source(source: &str) -> Result<ModuleIr> {
    compile_with_config(source, &CompileConfig::default())
}

/// Compile source code to an IR module
pub fn compile_with_config(
    source: &str,
    config: &CompileConfig,
) -> Result<ModuleIr> {
    let module = Compiler::with_config(config.clone())
        .compile(source)
        .context("Compilation failed")?;
    Ok(module)
}

/// Compile and run source code, capturing its output
pub fn run(source: &str) -> Result<RunOutcome> {
    run_with_config(source, &CompileConfig::default(), VmConfig::default())
}

/// Compile and run source code
pub fn run_with_config(
    source: &str,
    config: &CompileConfig,
    vm_config: VmConfig,
) -> Result<RunOutcome> {
    let module = compile_with_config(source, config)?;

    info!("Running `{}`", config.entry_name);
    let mut vm = Vm::with_config(&module, vm_config);
    let value = vm
        .run(&config.entry_name)
        .with_context(|| format!("Runtime error in module `{}`", module.name))?;
    debug!("Program returned {:?}", value);

    Ok(RunOutcome {
        value,
        output: vm.output().to_string(),
    })
}

/// Run a source file
pub fn run_file(path: &Path) -> Result<RunOutcome> {
    debug!("Running file {}", path.display());
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    run(&source)
}

/// Compile a source file and write the IR text to `output_path`
pub fn build_file(
    source_path: &Path,
    output_path: &Path,
    config: &CompileConfig,
) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("Failed to read source: {}", source_path.display()))?;
    let module = compile_with_config(&source, config)?;

    debug!("Writing IR to {}", output_path.display());
    fs::write(output_path, module.to_string())
        .with_context(|| format!("Failed to write output: {}", output_path.display()))?;
    Ok(())
}
