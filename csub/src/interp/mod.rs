//! Tree-walking interpreter for the C subset
//!
//! `run_program` is the usual entry: it loads the program's declarations,
//! calls `main()` and yields its integer result.

mod config;
mod error;
mod eval;
mod frame;
mod registry;
mod value;

pub use config::{DEFAULT_MAX_DEPTH, InterpConfig};
pub use error::{EvalError, EvalResult};
pub use eval::{Interpreter, eval_int_binary, eval_unary};
pub use frame::{Frame, Slot};
pub use registry::{Registry, StructType};
pub use value::{StructValue, Value};

use crate::ast::Program;

/// Name of the function a program starts at
pub const ENTRY_POINT: &str = "main";

/// Load `program` and run its `main`
pub fn run_program(program: Program, config: InterpConfig) -> EvalResult<i32> {
    let mut interp = Interpreter::with_config(program, config)?;
    interp.run_main()
}
