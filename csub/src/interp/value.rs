//! Runtime values for the interpreter

use super::error::{EvalError, EvalResult};
use super::registry::StructType;
use crate::ast::Type;
use std::fmt;
use std::rc::Rc;

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit two's-complement integer
    Int(i32),
    /// Struct instance, owned by whoever holds it
    Struct(StructValue),
    /// Result of a `void` function
    Void,
}

impl Value {
    /// C truth value: 1 or 0
    pub fn from_bool(b: bool) -> Self {
        Value::Int(i32::from(b))
    }

    /// Type of this value
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Struct(s) => Type::Struct(s.type_name().to_string()),
            Value::Void => Type::Void,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> String {
        self.ty().to_string()
    }

    /// Try to convert to i32
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer operand, or a type error naming what was found instead
    pub fn expect_int(&self) -> EvalResult<i32> {
        self.as_int()
            .ok_or_else(|| EvalError::type_mismatch(Type::Int, self.type_name()))
    }

    /// Struct operand, or a type error naming what was found instead
    pub fn expect_struct(&self) -> EvalResult<&StructValue> {
        match self {
            Value::Struct(s) => Ok(s),
            other => Err(EvalError::type_mismatch("struct", other.type_name())),
        }
    }

    /// Nonzero is true; only integers can be tested
    pub fn truthy(&self) -> EvalResult<bool> {
        Ok(self.expect_int()? != 0)
    }

    /// Whether the value may be stored in a binding of type `ty`
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Int(_), Type::Int) => true,
            (Value::Void, Type::Void) => true,
            (Value::Struct(s), Type::Struct(name)) => s.type_name() == name,
            _ => false,
        }
    }

    pub fn check_type(&self, ty: &Type) -> EvalResult<()> {
        if self.conforms_to(ty) {
            Ok(())
        } else {
            Err(EvalError::type_mismatch(ty, self.type_name()))
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

/// A struct instance: its declared type plus one slot per field, in
/// declaration order. Integer slots are `None` until assigned.
///
/// Cloning copies every slot, so a clone never aliases the original.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    ty: Rc<StructType>,
    fields: Vec<Option<Value>>,
}

impl StructValue {
    pub(crate) fn new(ty: Rc<StructType>, fields: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(ty.fields.len(), fields.len());
        StructValue { ty, fields }
    }

    pub fn type_name(&self) -> &str {
        &self.ty.name
    }

    fn index_of(&self, field: &str) -> EvalResult<usize> {
        self.ty
            .field_index(field)
            .ok_or_else(|| EvalError::unknown_field(&self.ty.name, field))
    }

    /// Current value of `field`
    pub fn get(&self, field: &str) -> EvalResult<&Value> {
        let idx = self.index_of(field)?;
        self.fields[idx]
            .as_ref()
            .ok_or_else(|| EvalError::uninitialized_field(&self.ty.name, field))
    }

    /// Assign `field`, checking the value against the declared field type
    pub fn set(&mut self, field: &str, value: Value) -> EvalResult<()> {
        self.set_path(&[field.to_string()], value)
    }

    /// Assign through a chain of field names (`a.b.c`)
    pub fn set_path(&mut self, path: &[String], value: Value) -> EvalResult<()> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(());
        };
        let idx = self.index_of(first)?;
        let field_ty = &self.ty.fields[idx].1;

        if rest.is_empty() {
            value.check_type(field_ty)?;
            self.fields[idx] = Some(value);
            return Ok(());
        }

        match &mut self.fields[idx] {
            Some(Value::Struct(inner)) => inner.set_path(rest, value),
            _ => Err(EvalError::type_mismatch("struct", field_ty)),
        }
    }

    /// (field name, slot) pairs in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.ty
            .fields
            .iter()
            .zip(&self.fields)
            .map(|((name, _), slot)| (name.as_str(), slot.as_ref()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Void => write!(f, "void"),
            Value::Struct(s) => {
                write!(f, "{} {{ ", s.type_name())?;
                for (i, (name, slot)) in s.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match slot {
                        Some(v) => write!(f, "{name}: {v}")?,
                        None => write!(f, "{name}: ?")?,
                    }
                }
                write!(f, " }}")
            }
        }
    }
}
