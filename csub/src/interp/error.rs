//! Runtime errors for the interpreter

use thiserror::Error;

/// Evaluation failure.
///
/// None of these are recoverable inside the evaluated program: they abort
/// the running call chain and surface from `run_program` unchanged, distinct
/// from whatever integer `main` would have returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid shift count {count}: must be in 0..=31")]
    InvalidShift { count: i32 },

    #[error("integer literal {value} does not fit in 32 bits")]
    LiteralOutOfRange { value: i64 },

    #[error("struct {struct_name} has no field named {field}")]
    UnknownField { struct_name: String, field: String },

    #[error("field {field} of struct {struct_name} read before it was assigned")]
    UninitializedField { struct_name: String, field: String },

    #[error("variable {name} read before it was assigned")]
    UninitializedVariable { name: String },

    #[error("undefined identifier: {name}")]
    UnknownIdentifier { name: String },

    #[error("undefined function: {name}")]
    UnknownFunction { name: String },

    #[error("undefined type: struct {name}")]
    UnknownType { name: String },

    #[error("function {name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("redeclaration of {name} in the same scope")]
    Redeclaration { name: String },

    #[error("duplicate declaration of {name}")]
    DuplicateDeclaration { name: String },

    #[error("struct {name} contains itself")]
    RecursiveStruct { name: String },

    #[error("type error: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("stack overflow: call depth exceeded {limit}")]
    StackOverflow { limit: usize },
}

impl EvalError {
    pub fn unknown_field(struct_name: &str, field: &str) -> Self {
        EvalError::UnknownField {
            struct_name: struct_name.to_string(),
            field: field.to_string(),
        }
    }

    pub fn uninitialized_field(struct_name: &str, field: &str) -> Self {
        EvalError::UninitializedField {
            struct_name: struct_name.to_string(),
            field: field.to_string(),
        }
    }

    pub fn uninitialized_variable(name: &str) -> Self {
        EvalError::UninitializedVariable {
            name: name.to_string(),
        }
    }

    pub fn unknown_identifier(name: &str) -> Self {
        EvalError::UnknownIdentifier {
            name: name.to_string(),
        }
    }

    pub fn unknown_function(name: &str) -> Self {
        EvalError::UnknownFunction {
            name: name.to_string(),
        }
    }

    pub fn unknown_type(name: &str) -> Self {
        EvalError::UnknownType {
            name: name.to_string(),
        }
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        EvalError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }
    }

    pub fn redeclaration(name: &str) -> Self {
        EvalError::Redeclaration {
            name: name.to_string(),
        }
    }

    pub fn duplicate_declaration(name: impl Into<String>) -> Self {
        EvalError::DuplicateDeclaration { name: name.into() }
    }

    pub fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        EvalError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Result type for interpreter operations
pub type EvalResult<T> = Result<T, EvalError>;
