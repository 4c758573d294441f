//! IR interpreter
//!
//! Executes an emitted [`ModuleIr`](crate::middle::ir::ModuleIr) so
//! generated values are observable.

pub use errors::{VmError, VmResult};
pub use executor::{Value, Vm, VmConfig};
pub use extfunc::{ExternalFunction, ExternalFunctionRegistry, IoContext, EXTERNAL_FUNCTIONS};

mod errors;
mod executor;
mod extfunc;

#[cfg(test)]
mod tests;
