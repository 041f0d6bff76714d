//! Expression evaluator, statement executor and call dispatcher

use super::ENTRY_POINT;
use super::config::InterpConfig;
use super::error::{EvalError, EvalResult};
use super::frame::Frame;
use super::registry::Registry;
use super::value::Value;
use crate::ast::{BinOp, Expr, FnDef, Program, Spanned, Stmt, UnOp};

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Tree-walking interpreter over a loaded program.
///
/// Each call runs in its own `Frame`, owned by the native stack of the
/// dispatcher; `depth` counts the frames currently alive and is bounded by
/// `InterpConfig::max_depth`.
pub struct Interpreter {
    registry: Registry,
    config: InterpConfig,
    depth: usize,
}

impl Interpreter {
    pub fn new(program: Program) -> EvalResult<Self> {
        Self::with_config(program, InterpConfig::default())
    }

    /// Load `program` into fresh registries
    pub fn with_config(program: Program, config: InterpConfig) -> EvalResult<Self> {
        Ok(Interpreter {
            registry: Registry::load(program)?,
            config,
            depth: 0,
        })
    }

    /// Number of active call frames; zero whenever no call is running
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Call `main()` and return its integer result
    pub fn run_main(&mut self) -> EvalResult<i32> {
        self.call(ENTRY_POINT, Vec::new())?.expect_int()
    }

    /// Call a registered function with already evaluated arguments
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let def = self.registry.function(name)?;
        self.call_function(&def, args)
    }

    /// Evaluate an expression outside any function, in an empty frame
    pub fn eval_expr(&mut self, expr: &Spanned<Expr>) -> EvalResult<Value> {
        let mut frame = Frame::new("<expr>");
        self.eval(expr, &mut frame)
    }

    /// Evaluate an expression against caller-provided locals
    pub fn eval_expr_in(&mut self, expr: &Spanned<Expr>, frame: &mut Frame) -> EvalResult<Value> {
        self.eval(expr, frame)
    }

    // ============================================
    // Calls
    // ============================================

    /// Call a user-defined function with automatic stack growth
    fn call_function(&mut self, def: &FnDef, args: Vec<Value>) -> EvalResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(def, args)
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %def.name.node, depth = self.depth + 1))]
    fn call_function_inner(&mut self, def: &FnDef, args: Vec<Value>) -> EvalResult<Value> {
        if def.params.len() != args.len() {
            return Err(EvalError::arity_mismatch(
                &def.name.node,
                def.params.len(),
                args.len(),
            ));
        }

        if self.depth >= self.config.max_depth {
            return Err(EvalError::StackOverflow {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let result = self.invoke(def, args);
        self.depth -= 1;
        result
    }

    fn invoke(&mut self, def: &FnDef, args: Vec<Value>) -> EvalResult<Value> {
        let mut frame = Frame::new(def.name.node.as_str());

        // Parameters live in the same scope as the body's top-level declarations
        for (param, arg) in def.params.iter().zip(args) {
            frame.declare(&param.name.node, param.ty.node.clone(), Some(arg))?;
        }

        self.exec_block(&def.body, &mut frame)?;

        let value = match frame.take_return() {
            Some(value) => value,
            None => {
                tracing::trace!(function = %def.name.node, "implicit return");
                self.registry.zero_value(&def.ret_ty.node)?
            }
        };
        value.check_type(&def.ret_ty.node)?;
        Ok(value)
    }

    // ============================================
    // Statements
    // ============================================

    /// Run statements in order until one of them returns
    fn exec_block(&mut self, stmts: &[Spanned<Stmt>], frame: &mut Frame) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt, frame)?;
            if frame.has_returned() {
                break;
            }
        }
        Ok(())
    }

    /// Run `stmts` inside a fresh block scope
    fn exec_scoped(&mut self, stmts: &[Spanned<Stmt>], frame: &mut Frame) -> EvalResult<()> {
        frame.push_scope();
        let result = self.exec_block(stmts, frame);
        frame.pop_scope();
        result
    }

    /// Execute one statement with automatic stack growth; nested blocks
    /// and `else if` chains recurse through here.
    fn exec_stmt(&mut self, stmt: &Spanned<Stmt>, frame: &mut Frame) -> EvalResult<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_stmt_inner(stmt, frame)
        })
    }

    fn exec_stmt_inner(&mut self, stmt: &Spanned<Stmt>, frame: &mut Frame) -> EvalResult<()> {
        match &stmt.node {
            Stmt::Decl { ty, name, init } => {
                self.registry.check_object_type(&ty.node)?;
                let value = match init {
                    Some(init) => Some(self.eval(init, frame)?),
                    None => self.registry.uninit_value(&ty.node)?,
                };
                frame.declare(&name.node, ty.node.clone(), value)
            }

            Stmt::Assign { target, value } => {
                let value = self.eval(value, frame)?;
                frame.assign(&target.node, value)
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond, frame)?.truthy()? {
                    self.exec_scoped(std::slice::from_ref(&**then_branch), frame)
                } else if let Some(else_branch) = else_branch {
                    self.exec_scoped(std::slice::from_ref(&**else_branch), frame)
                } else {
                    Ok(())
                }
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, frame)?,
                    None => Value::Void,
                };
                frame.set_return(value);
                Ok(())
            }

            Stmt::Block(stmts) => self.exec_scoped(stmts, frame),

            Stmt::Expr(expr) => self.eval(expr, frame).map(|_| ()),

            Stmt::Empty => Ok(()),
        }
    }

    // ============================================
    // Expressions
    // ============================================

    /// Evaluate an expression with automatic stack growth
    fn eval(&mut self, expr: &Spanned<Expr>, frame: &mut Frame) -> EvalResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, frame))
    }

    fn eval_inner(&mut self, expr: &Spanned<Expr>, frame: &mut Frame) -> EvalResult<Value> {
        match &expr.node {
            // Literals up to 0xFFFFFFFF reinterpret as two's complement
            Expr::IntLit(n) => u32::try_from(*n)
                .map(|bits| Value::Int(bits as i32))
                .map_err(|_| EvalError::LiteralOutOfRange { value: *n }),

            Expr::Var(name) => frame.read_var(name).cloned(),

            Expr::FieldAccess { expr: base, field } => match read_place(&base.node, frame) {
                Some(place) => Ok(place?.expect_struct()?.get(&field.node)?.clone()),
                None => {
                    let value = self.eval(base, frame)?;
                    Ok(value.expect_struct()?.get(&field.node)?.clone())
                }
            },

            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right, frame),

            Expr::Unary { op, expr: operand } => {
                let n = self.eval(operand, frame)?.expect_int()?;
                Ok(Value::Int(eval_unary(*op, n)))
            }

            Expr::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<EvalResult<Vec<_>>>()?;
                self.call(func, values)
            }
        }
    }

    fn eval_binary(
        &mut self,
        left: &Spanned<Expr>,
        op: BinOp,
        right: &Spanned<Expr>,
        frame: &mut Frame,
    ) -> EvalResult<Value> {
        match op {
            BinOp::And => {
                if !self.eval(left, frame)?.truthy()? {
                    return Ok(Value::from_bool(false));
                }
                let r = self.eval(right, frame)?.truthy()?;
                Ok(Value::from_bool(r))
            }
            BinOp::Or => {
                if self.eval(left, frame)?.truthy()? {
                    return Ok(Value::from_bool(true));
                }
                let r = self.eval(right, frame)?.truthy()?;
                Ok(Value::from_bool(r))
            }
            _ => {
                let l = self.eval(left, frame)?.expect_int()?;
                let r = self.eval(right, frame)?.expect_int()?;
                eval_int_binary(op, l, r).map(Value::Int)
            }
        }
    }
}

/// Borrow the value named by a variable or field chain without copying it.
/// `None` when `expr` is not such a chain.
fn read_place<'f>(expr: &Expr, frame: &'f Frame) -> Option<EvalResult<&'f Value>> {
    match expr {
        Expr::Var(name) => Some(frame.read_var(name)),
        Expr::FieldAccess { expr: base, field } => {
            let base = read_place(&base.node, frame)?;
            Some(base.and_then(|value| value.expect_struct()?.get(&field.node)))
        }
        _ => None,
    }
}

/// Integer binary operation with 32-bit two's-complement wraparound
pub fn eval_int_binary(op: BinOp, l: i32, r: i32) -> EvalResult<i32> {
    Ok(match op {
        BinOp::Add => l.wrapping_add(r),
        BinOp::Sub => l.wrapping_sub(r),
        BinOp::Mul => l.wrapping_mul(r),
        BinOp::Div => {
            if r == 0 {
                return Err(EvalError::DivisionByZero);
            }
            l.wrapping_div(r)
        }
        BinOp::Mod => {
            if r == 0 {
                return Err(EvalError::DivisionByZero);
            }
            l.wrapping_rem(r)
        }

        BinOp::Eq => i32::from(l == r),
        BinOp::Ne => i32::from(l != r),
        BinOp::Lt => i32::from(l < r),
        BinOp::Gt => i32::from(l > r),
        BinOp::Le => i32::from(l <= r),
        BinOp::Ge => i32::from(l >= r),

        BinOp::BitAnd => l & r,
        BinOp::BitOr => l | r,
        BinOp::BitXor => l ^ r,
        BinOp::Shl => l.wrapping_shl(shift_count(r)?),
        // Arithmetic shift: the sign bit is replicated
        BinOp::Shr => l.wrapping_shr(shift_count(r)?),

        BinOp::And => i32::from(l != 0 && r != 0),
        BinOp::Or => i32::from(l != 0 || r != 0),
    })
}

fn shift_count(count: i32) -> EvalResult<u32> {
    u32::try_from(count)
        .ok()
        .filter(|c| *c < i32::BITS)
        .ok_or(EvalError::InvalidShift { count })
}

pub fn eval_unary(op: UnOp, n: i32) -> i32 {
    match op {
        UnOp::Neg => n.wrapping_neg(),
        UnOp::Not => i32::from(n == 0),
        UnOp::BitNot => !n,
    }
}
