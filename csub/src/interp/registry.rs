//! Function and struct registries
//!
//! Built once from a `Program` and never mutated afterwards; every call
//! shares the same read-only definitions.

use super::error::{EvalError, EvalResult};
use super::value::{StructValue, Value};
use crate::ast::{FnDef, Item, Program, StructDef, Type};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A declared struct type: ordered (field name, field type) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
}

impl StructType {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field, _)| field == name)
    }
}

/// Declarations of a loaded program
#[derive(Debug, Default)]
pub struct Registry {
    functions: HashMap<String, Rc<FnDef>>,
    structs: HashMap<String, Rc<StructType>>,
}

impl Registry {
    /// Register every item of `program`, validating names and types.
    /// Function bodies are moved into the registry, not copied.
    pub fn load(program: Program) -> EvalResult<Self> {
        let mut registry = Registry::default();
        let mut seen = HashSet::new();

        for item in program.items {
            if !seen.insert(item.name().to_string()) {
                return Err(EvalError::duplicate_declaration(item.name()));
            }
            match item {
                Item::StructDef(def) => {
                    let ty = struct_type_of(&def)?;
                    registry.structs.insert(ty.name.clone(), Rc::new(ty));
                }
                Item::FnDef(def) => {
                    registry
                        .functions
                        .insert(def.name.node.clone(), Rc::new(def));
                }
            }
        }

        registry.validate_structs()?;
        registry.validate_functions()?;

        tracing::debug!(
            functions = registry.functions.len(),
            structs = registry.structs.len(),
            "program loaded"
        );
        Ok(registry)
    }

    /// Resolve a function by name
    pub fn function(&self, name: &str) -> EvalResult<Rc<FnDef>> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::unknown_function(name))
    }

    /// Resolve a struct type by name
    pub fn struct_type(&self, name: &str) -> EvalResult<&Rc<StructType>> {
        self.structs
            .get(name)
            .ok_or_else(|| EvalError::unknown_type(name))
    }

    /// Check that `ty` names a storable type: `int` or a declared struct
    pub fn check_object_type(&self, ty: &Type) -> EvalResult<()> {
        match ty {
            Type::Int => Ok(()),
            Type::Struct(name) => self.struct_type(name).map(|_| ()),
            Type::Void => Err(EvalError::type_mismatch("object type", ty)),
        }
    }

    /// Value a function of return type `ty` yields when its body ends
    /// without a `return`: `0`, a struct of zeros, or `void`.
    pub fn zero_value(&self, ty: &Type) -> EvalResult<Value> {
        match ty {
            Type::Int => Ok(Value::Int(0)),
            Type::Void => Ok(Value::Void),
            Type::Struct(name) => {
                let st = self.struct_type(name)?;
                let fields = st
                    .fields
                    .iter()
                    .map(|(_, field_ty)| self.zero_value(field_ty).map(Some))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::Struct(StructValue::new(Rc::clone(st), fields)))
            }
        }
    }

    /// Contents of a declaration without initializer: integers are
    /// unassigned, structs are materialised with unassigned integer fields.
    pub fn uninit_value(&self, ty: &Type) -> EvalResult<Option<Value>> {
        match ty {
            Type::Int => Ok(None),
            Type::Void => Err(EvalError::type_mismatch("object type", ty)),
            Type::Struct(name) => {
                let st = self.struct_type(name)?;
                let fields = st
                    .fields
                    .iter()
                    .map(|(_, field_ty)| self.uninit_value(field_ty))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Some(Value::Struct(StructValue::new(Rc::clone(st), fields))))
            }
        }
    }

    fn validate_structs(&self) -> EvalResult<()> {
        for st in self.structs.values() {
            for (_, field_ty) in &st.fields {
                self.check_object_type(field_ty)?;
            }
        }

        // Field types all resolve now, so a walk over struct-typed fields
        // terminates unless some struct contains itself by value.
        let mut done = HashSet::new();
        for name in self.structs.keys() {
            self.check_acyclic(name, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }

    fn check_acyclic<'a>(
        &'a self,
        name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> EvalResult<()> {
        if done.contains(name) {
            return Ok(());
        }
        if path.contains(&name) {
            return Err(EvalError::RecursiveStruct {
                name: name.to_string(),
            });
        }
        path.push(name);
        let st = self.struct_type(name)?;
        for (_, field_ty) in &st.fields {
            if let Type::Struct(inner) = field_ty {
                self.check_acyclic(inner, path, done)?;
            }
        }
        path.pop();
        done.insert(name);
        Ok(())
    }

    fn validate_functions(&self) -> EvalResult<()> {
        for def in self.functions.values() {
            let mut params = HashSet::new();
            for param in &def.params {
                if !params.insert(param.name.node.as_str()) {
                    return Err(EvalError::duplicate_declaration(format!(
                        "{}.{}",
                        def.name.node, param.name.node
                    )));
                }
                self.check_object_type(&param.ty.node)?;
            }
            if let Some(name) = def.ret_ty.node.struct_name() {
                self.struct_type(name)?;
            }
        }
        Ok(())
    }
}

fn struct_type_of(def: &StructDef) -> EvalResult<StructType> {
    let mut names = HashSet::new();
    let mut fields = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        if !names.insert(field.name.node.as_str()) {
            return Err(EvalError::duplicate_declaration(format!(
                "{}.{}",
                def.name.node, field.name.node
            )));
        }
        fields.push((field.name.node.clone(), field.ty.node.clone()));
    }
    Ok(StructType {
        name: def.name.node.clone(),
        fields,
    })
}
