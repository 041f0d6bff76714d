//! C-subset evaluator library
//!
//! Front end (lexer, parser) plus an interpreter that runs a program's
//! `main` and reports the integer it returns.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use ast::Span;
pub use error::{CompileError, Result};
pub use interp::{EvalError, EvalResult, InterpConfig, run_program};
