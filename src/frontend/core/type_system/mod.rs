//! Semantic types
//!
//! Every expression resolves to an [`ExType`] when it is constructed.

use std::fmt;

/// Resolved semantic type of a declaration or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExType {
    Int,
    Float,
    Str,
    Char,
    Bool,
    Void,
    Method,
    Class,
}

impl ExType {
    /// Parse the text of a type token
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ExType::Int),
            "float" => Some(ExType::Float),
            "str" => Some(ExType::Str),
            "char" => Some(ExType::Char),
            "bool" => Some(ExType::Bool),
            "void" => Some(ExType::Void),
            "method" => Some(ExType::Method),
            "class" => Some(ExType::Class),
            _ => None,
        }
    }

    /// Source keyword for this type
    pub fn name(self) -> &'static str {
        match self {
            ExType::Int => "int",
            ExType::Float => "float",
            ExType::Str => "str",
            ExType::Char => "char",
            ExType::Bool => "bool",
            ExType::Void => "void",
            ExType::Method => "method",
            ExType::Class => "class",
        }
    }

    /// `int` and `float` support arithmetic
    pub fn is_numeric(self) -> bool {
        matches!(self, ExType::Int | ExType::Float)
    }

    /// Types with a total order usable by `<`, `<=`, `>`, `>=`
    pub fn is_ordered(self) -> bool {
        matches!(self, ExType::Int | ExType::Float | ExType::Char)
    }

    /// Types that can be stored in a property
    pub fn is_storable(self) -> bool {
        !matches!(self, ExType::Void | ExType::Method | ExType::Class)
    }
}

impl fmt::Display for ExType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a callable: user method or builtin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub return_type: ExType,
    pub params: Vec<ExType>,
    /// Accepts any number of further non-void arguments after `params`
    pub variadic: bool,
    /// Supplied by the embedding application rather than defined in source
    pub builtin: bool,
}

impl FunctionSignature {
    /// Signature of a user method (Sapling methods take no parameters)
    pub fn method(return_type: ExType) -> Self {
        Self {
            return_type,
            params: Vec::new(),
            variadic: false,
            builtin: false,
        }
    }

    /// Signature of an externally supplied builtin
    pub fn builtin(
        return_type: ExType,
        params: Vec<ExType>,
        variadic: bool,
    ) -> Self {
        Self {
            return_type,
            params,
            variadic,
            builtin: true,
        }
    }
}
