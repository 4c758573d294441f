//! Nested lexical scopes
//!
//! Scopes live in an arena ([`ScopeTree`]) and are addressed by
//! [`ScopeId`]; each scope stores its parent as an id. The parser creates a
//! child scope for every method and class body and records declared types
//! and function signatures while it descends. Generation only reads the
//! tree; the values it binds live in a separate [`ValueTable`] keyed by the
//! same ids.
//!
//! Lookups climb from a scope through its parents until the name is found.

use crate::frontend::core::type_system::{ExType, FunctionSignature};
use crate::util::span::Span;
use indexmap::IndexMap;
use tracing::trace;

/// Index of a scope in a [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The outermost scope, where builtins are registered
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// What created a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOwner {
    /// The compilation unit itself
    Root,
    /// A method body
    Method(String),
    /// A class body
    Class(String),
}

/// Scope lookup / declaration failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScopeError {
    #[error("Undefined identifier `{name}` at {span}")]
    UndefinedIdentifier { name: String, span: Span },

    #[error("Undefined function `{name}` at {span}")]
    UndefinedFunction { name: String, span: Span },

    #[error("`{name}` is already declared in this scope (at {span})")]
    Redeclaration { name: String, span: Span },

    #[error("`{name}` names a {ty}, not a value, at {span}")]
    NotAValue { name: String, ty: ExType, span: Span },
}

impl ScopeError {
    /// Attach the source span of the offending reference
    pub fn at(
        self,
        span: Span,
    ) -> Self {
        match self {
            ScopeError::UndefinedIdentifier { name, .. } => {
                ScopeError::UndefinedIdentifier { name, span }
            }
            ScopeError::UndefinedFunction { name, .. } => ScopeError::UndefinedFunction { name, span },
            ScopeError::Redeclaration { name, .. } => ScopeError::Redeclaration { name, span },
            ScopeError::NotAValue { name, ty, .. } => ScopeError::NotAValue { name, ty, span },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScopeError::UndefinedIdentifier { name, .. }
            | ScopeError::UndefinedFunction { name, .. }
            | ScopeError::Redeclaration { name, .. }
            | ScopeError::NotAValue { name, .. } => name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ScopeError::UndefinedIdentifier { span, .. }
            | ScopeError::UndefinedFunction { span, .. }
            | ScopeError::Redeclaration { span, .. }
            | ScopeError::NotAValue { span, .. } => *span,
        }
    }
}

/// One lexical environment
#[derive(Debug, Clone)]
pub struct Scope {
    parent: Option<ScopeId>,
    owner: ScopeOwner,
    types: IndexMap<String, ExType>,
    functions: IndexMap<String, FunctionSignature>,
}

impl Scope {
    fn new(
        parent: Option<ScopeId>,
        owner: ScopeOwner,
    ) -> Self {
        Self {
            parent,
            owner,
            types: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn owner(&self) -> &ScopeOwner {
        &self.owner
    }

    /// Properties declared directly in this scope, in declaration order
    pub fn types(&self) -> &IndexMap<String, ExType> {
        &self.types
    }

    /// Functions declared directly in this scope, in declaration order
    pub fn functions(&self) -> &IndexMap<String, FunctionSignature> {
        &self.functions
    }
}

/// Arena of scopes
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    strict_redeclaration: bool,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the root scope; redeclaration overwrites
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, ScopeOwner::Root)],
            strict_redeclaration: false,
        }
    }

    /// Make a second declaration of a name in the same scope an error
    pub fn with_strict_redeclaration(
        mut self,
        strict: bool,
    ) -> Self {
        self.strict_redeclaration = strict;
        self
    }

    /// Create a child scope
    pub fn push(
        &mut self,
        parent: ScopeId,
        owner: ScopeOwner,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        trace!("Scope {:?} opened for {:?} under {:?}", id, owner, parent);
        self.scopes.push(Scope::new(Some(parent), owner));
        id
    }

    pub fn get(
        &self,
        id: ScopeId,
    ) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn parent(
        &self,
        id: ScopeId,
    ) -> Option<ScopeId> {
        self.get(id).parent
    }

    pub fn owner(
        &self,
        id: ScopeId,
    ) -> &ScopeOwner {
        &self.get(id).owner
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// `id` followed by each enclosing scope up to the root
    pub fn ancestors(
        &self,
        id: ScopeId,
    ) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.parent(current))
    }

    /// Bind a property type in `scope`
    pub fn declare_type(
        &mut self,
        scope: ScopeId,
        id: &str,
        ty: ExType,
    ) -> Result<(), ScopeError> {
        let strict = self.strict_redeclaration;
        let types = &mut self.scopes[scope.0].types;
        if strict && types.contains_key(id) {
            return Err(ScopeError::Redeclaration {
                name: id.to_string(),
                span: Span::dummy(),
            });
        }
        trace!("Declared `{}: {}` in {:?}", id, ty, scope);
        types.insert(id.to_string(), ty);
        Ok(())
    }

    /// Bind a function signature in `scope`
    pub fn declare_function_signature(
        &mut self,
        scope: ScopeId,
        id: &str,
        signature: FunctionSignature,
    ) -> Result<(), ScopeError> {
        let strict = self.strict_redeclaration;
        let functions = &mut self.scopes[scope.0].functions;
        if strict && functions.contains_key(id) {
            return Err(ScopeError::Redeclaration {
                name: id.to_string(),
                span: Span::dummy(),
            });
        }
        trace!(
            "Declared function `{}` -> {} in {:?}",
            id,
            signature.return_type,
            scope
        );
        functions.insert(id.to_string(), signature);
        Ok(())
    }

    /// Type of the nearest property named `id`
    pub fn lookup_type(
        &self,
        scope: ScopeId,
        id: &str,
    ) -> Result<ExType, ScopeError> {
        self.ancestors(scope)
            .find_map(|s| self.get(s).types.get(id).copied())
            .ok_or_else(|| ScopeError::UndefinedIdentifier {
                name: id.to_string(),
                span: Span::dummy(),
            })
    }

    /// Signature of the nearest function named `id`
    pub fn lookup_function_signature(
        &self,
        scope: ScopeId,
        id: &str,
    ) -> Result<&FunctionSignature, ScopeError> {
        self.ancestors(scope)
            .find_map(|s| self.get(s).functions.get(id))
            .ok_or_else(|| ScopeError::UndefinedFunction {
                name: id.to_string(),
                span: Span::dummy(),
            })
    }

    /// Scope that declares the function visible as `id` from `scope`
    pub fn function_scope(
        &self,
        scope: ScopeId,
        id: &str,
    ) -> Option<ScopeId> {
        self.ancestors(scope)
            .find(|&s| self.get(s).functions.contains_key(id))
    }
}

/// Values bound per scope during generation
///
/// Kept apart from [`ScopeTree`] so the tree can be shared immutably while
/// a backend-specific value type is recorded here.
#[derive(Debug, Clone)]
pub struct ValueTable<T> {
    tables: Vec<IndexMap<String, T>>,
}

impl<T> Default for ValueTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueTable<T> {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Bind `value` to `id` in `scope` (last write wins)
    pub fn bind_value(
        &mut self,
        scope: ScopeId,
        id: &str,
        value: T,
    ) {
        if self.tables.len() <= scope.0 {
            self.tables.resize_with(scope.0 + 1, IndexMap::new);
        }
        self.tables[scope.0].insert(id.to_string(), value);
    }

    /// Nearest value bound to `id`, climbing the scopes of `tree`
    pub fn lookup_value(
        &self,
        tree: &ScopeTree,
        scope: ScopeId,
        id: &str,
    ) -> Result<&T, ScopeError> {
        tree.ancestors(scope)
            .find_map(|s| self.tables.get(s.0).and_then(|table| table.get(id)))
            .ok_or_else(|| ScopeError::UndefinedIdentifier {
                name: id.to_string(),
                span: Span::dummy(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method_scope(tree: &mut ScopeTree) -> ScopeId {
        tree.push(ScopeId::ROOT, ScopeOwner::Method("m".into()))
    }

    #[test]
    fn test_root_scope() {
        let tree = ScopeTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.parent(ScopeId::ROOT), None);
        assert_eq!(tree.owner(ScopeId::ROOT), &ScopeOwner::Root);
    }

    #[test]
    fn test_lookup_climbs_parents() {
        let mut tree = ScopeTree::new();
        tree.declare_type(ScopeId::ROOT, "x", ExType::Int).unwrap();
        let inner = method_scope(&mut tree);
        let innermost = tree.push(inner, ScopeOwner::Class("C".into()));

        assert_eq!(tree.lookup_type(innermost, "x"), Ok(ExType::Int));
        assert_eq!(tree.ancestors(innermost).count(), 3);
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let mut tree = ScopeTree::new();
        tree.declare_type(ScopeId::ROOT, "x", ExType::Int).unwrap();
        let inner = method_scope(&mut tree);
        tree.declare_type(inner, "x", ExType::Str).unwrap();

        assert_eq!(tree.lookup_type(inner, "x"), Ok(ExType::Str));
        assert_eq!(tree.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Int));
    }

    #[test]
    fn test_child_declarations_invisible_to_parent() {
        let mut tree = ScopeTree::new();
        let inner = method_scope(&mut tree);
        tree.declare_type(inner, "y", ExType::Bool).unwrap();

        let err = tree.lookup_type(ScopeId::ROOT, "y").unwrap_err();
        assert!(matches!(err, ScopeError::UndefinedIdentifier { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_redeclaration_last_write_wins() {
        let mut tree = ScopeTree::new();
        tree.declare_type(ScopeId::ROOT, "x", ExType::Int).unwrap();
        tree.declare_type(ScopeId::ROOT, "x", ExType::Float).unwrap();
        assert_eq!(tree.lookup_type(ScopeId::ROOT, "x"), Ok(ExType::Float));
    }

    #[test]
    fn test_strict_redeclaration() {
        let mut tree = ScopeTree::new().with_strict_redeclaration(true);
        tree.declare_type(ScopeId::ROOT, "x", ExType::Int).unwrap();
        let err = tree.declare_type(ScopeId::ROOT, "x", ExType::Int).unwrap_err();
        assert!(matches!(err, ScopeError::Redeclaration { .. }));

        // shadowing in a child scope is still allowed
        let inner = method_scope(&mut tree);
        assert!(tree.declare_type(inner, "x", ExType::Int).is_ok());
    }

    #[test]
    fn test_function_signatures() {
        let mut tree = ScopeTree::new();
        tree.declare_function_signature(
            ScopeId::ROOT,
            "print",
            FunctionSignature::builtin(ExType::Void, vec![], true),
        )
        .unwrap();
        let inner = method_scope(&mut tree);
        tree.declare_function_signature(inner, "f", FunctionSignature::method(ExType::Int))
            .unwrap();

        assert!(tree.lookup_function_signature(inner, "print").unwrap().builtin);
        assert_eq!(
            tree.lookup_function_signature(inner, "f").unwrap().return_type,
            ExType::Int
        );
        assert_eq!(tree.function_scope(inner, "print"), Some(ScopeId::ROOT));
        assert!(matches!(
            tree.lookup_function_signature(ScopeId::ROOT, "f"),
            Err(ScopeError::UndefinedFunction { .. })
        ));
    }

    #[test]
    fn test_types_and_functions_are_separate_namespaces() {
        let mut tree = ScopeTree::new();
        tree.declare_function_signature(ScopeId::ROOT, "f", FunctionSignature::method(ExType::Int))
            .unwrap();
        assert!(tree.lookup_type(ScopeId::ROOT, "f").is_err());
    }

    #[test]
    fn test_value_table_lookup() {
        let mut tree = ScopeTree::new();
        let inner = method_scope(&mut tree);
        let mut values = ValueTable::new();
        values.bind_value(ScopeId::ROOT, "x", 1);
        values.bind_value(inner, "y", 2);

        assert_eq!(values.lookup_value(&tree, inner, "x"), Ok(&1));
        assert_eq!(values.lookup_value(&tree, inner, "y"), Ok(&2));
        assert!(values.lookup_value(&tree, ScopeId::ROOT, "y").is_err());

        values.bind_value(inner, "x", 3);
        assert_eq!(values.lookup_value(&tree, inner, "x"), Ok(&3));
    }

    #[test]
    fn test_error_span_attachment() {
        let span = Span::new(
            crate::util::span::Position::with_offset(1, 1, 0),
            crate::util::span::Position::with_offset(1, 2, 1),
        );
        let err = ScopeTree::new()
            .lookup_type(ScopeId::ROOT, "q")
            .unwrap_err()
            .at(span);
        assert_eq!(err.span(), span);
        assert_eq!(err.name(), "q");
        assert_eq!(err.to_string(), "Undefined identifier `q` at [1:1 - 1:2]");
    }
}
