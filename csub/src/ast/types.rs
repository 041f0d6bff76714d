//! Type AST nodes

use serde::{Deserialize, Serialize};

/// Type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// 32-bit signed two's-complement integer
    Int,
    /// No value (function results only)
    Void,
    /// `struct Name`
    Struct(String),
}

impl Type {
    /// Name of the struct type, if this is one
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Type::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Void => write!(f, "void"),
            Type::Struct(name) => write!(f, "struct {name}"),
        }
    }
}
