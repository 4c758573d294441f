//! VM errors

use thiserror::Error;

/// VM result
pub type VmResult<T> = Result<T, VmError>;

/// VM errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown external function: {0}")]
    UnknownExternal(String),

    #[error("Reached unreachable code in `{0}`")]
    Unreachable(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Call depth exceeded the limit of {0}")]
    CallDepthExceeded(usize),

    #[error("Read of uninitialized slot {0}")]
    UninitializedSlot(String),

    #[error("Entry function `{0}` not found")]
    MissingEntry(String),
}
