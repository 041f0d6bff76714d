//! Abstract Syntax Tree definitions
//!
//! This is the parsed form the evaluator consumes. It can come from the
//! bundled parser or be deserialized from JSON.

mod expr;
mod span;
mod stmt;
mod types;

pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;

use serde::{Deserialize, Serialize};

/// A translation unit: struct and function declarations in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    FnDef(FnDef),
    StructDef(StructDef),
}

/// Struct definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
    pub name: Spanned<String>,
    pub fields: Vec<StructField>,
    pub span: Span,
}

/// Struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: Spanned<String>,
    pub ty: Spanned<Type>,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDef {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub ret_ty: Spanned<Type>,
    pub body: Vec<Spanned<Stmt>>,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<Type>,
}

impl Item {
    /// Declared name of the item
    pub fn name(&self) -> &str {
        match self {
            Item::FnDef(f) => &f.name.node,
            Item::StructDef(s) => &s.name.node,
        }
    }
}
