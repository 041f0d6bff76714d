//! Per-call variable storage
//!
//! Each active call owns one `Frame`: a stack of lexical scopes plus the
//! pending return value. Scopes are a plain `Vec<HashMap>` so a block's
//! bindings are dropped as soon as the block exits. Lookups never leave
//! the frame; a callee cannot see its caller's locals.

use super::error::{EvalError, EvalResult};
use super::value::Value;
use crate::ast::{LValue, Type};
use std::collections::HashMap;

/// A declared variable: its type and current contents
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub ty: Type,
    /// `None` until the first assignment for `int` variables
    pub value: Option<Value>,
}

/// Activation record for one function call
#[derive(Debug)]
pub struct Frame {
    function: String,
    /// Index 0 holds the parameters and the function body's declarations
    scopes: Vec<HashMap<String, Slot>>,
    returned: Option<Value>,
}

impl Frame {
    pub fn new(function: impl Into<String>) -> Self {
        Frame {
            function: function.into(),
            scopes: vec![HashMap::new()],
            returned: None,
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
        tracing::trace!(function = %self.function, depth = self.scopes.len(), "enter scope");
    }

    /// Pop the innermost scope; the outermost scope lives as long as the frame
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            tracing::trace!(function = %self.function, depth = self.scopes.len(), "exit scope");
        }
    }

    /// Current scope depth
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope. Shadowing an outer scope is
    /// allowed; declaring the same name twice in one scope is not.
    pub fn declare(&mut self, name: &str, ty: Type, value: Option<Value>) -> EvalResult<()> {
        if let Some(v) = &value {
            v.check_type(&ty)?;
        }
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| EvalError::unknown_identifier(name))?;
        if scope.contains_key(name) {
            return Err(EvalError::redeclaration(name));
        }
        scope.insert(name.to_string(), Slot { ty, value });
        Ok(())
    }

    /// Innermost binding of `name`
    pub fn lookup(&self, name: &str) -> Option<&Slot> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Borrow the current value of `name`
    pub fn read_var(&self, name: &str) -> EvalResult<&Value> {
        let slot = self
            .lookup(name)
            .ok_or_else(|| EvalError::unknown_identifier(name))?;
        slot.value
            .as_ref()
            .ok_or_else(|| EvalError::uninitialized_variable(name))
    }

    /// Store `value` into a variable or a field path below it
    pub fn assign(&mut self, target: &LValue, value: Value) -> EvalResult<()> {
        let slot = self
            .lookup_mut(&target.var)
            .ok_or_else(|| EvalError::unknown_identifier(&target.var))?;

        if target.fields.is_empty() {
            value.check_type(&slot.ty)?;
            slot.value = Some(value);
            return Ok(());
        }

        match &mut slot.value {
            Some(Value::Struct(s)) => s.set_path(&target.fields, value),
            _ => Err(EvalError::type_mismatch("struct", &slot.ty)),
        }
    }

    /// Record the value of a `return`; statement execution stops at the
    /// next statement boundary.
    pub fn set_return(&mut self, value: Value) {
        self.returned = Some(value);
    }

    pub fn has_returned(&self) -> bool {
        self.returned.is_some()
    }

    pub fn take_return(&mut self) -> Option<Value> {
        self.returned.take()
    }
}
