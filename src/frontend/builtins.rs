//! Builtin function signatures
//!
//! Builtins are not declared in Sapling source. The embedding application
//! registers their signatures in the root scope before parsing; the VM
//! provides the matching implementations.

use crate::frontend::core::scope::{ScopeError, ScopeId, ScopeTree};
use crate::frontend::core::type_system::{ExType, FunctionSignature};
use tracing::debug;

/// Name and signature of every builtin
pub fn builtin_signatures() -> Vec<(&'static str, FunctionSignature)> {
    vec![
        ("print", FunctionSignature::builtin(ExType::Void, Vec::new(), true)),
        ("println", FunctionSignature::builtin(ExType::Void, Vec::new(), true)),
        ("input", FunctionSignature::builtin(ExType::Str, Vec::new(), false)),
    ]
}

/// Declare all builtins in the root scope of `scopes`
pub fn register_builtins(scopes: &mut ScopeTree) -> Result<(), ScopeError> {
    for (name, signature) in builtin_signatures() {
        scopes.declare_function_signature(ScopeId::ROOT, name, signature)?;
    }
    debug!("Registered {} builtins", builtin_signatures().len());
    Ok(())
}
