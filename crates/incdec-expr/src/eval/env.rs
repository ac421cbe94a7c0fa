use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{
    ast::node::Variable,
    error::runtime::RuntimeError,
    reflect::MemberInfo,
    value::{ArrayRef, ObjectRef, Value},
};

/// Storage the executors read from and write to.
///
/// Variables and static members live in the host. Instance members, array
/// elements and indexed properties live in shared objects and arrays; the
/// provided methods access them directly and can be overridden to intercept
/// those accesses.
pub trait Host {
    fn read_variable(&self, variable: &Variable) -> Result<Value, RuntimeError>;

    fn write_variable(&mut self, variable: &Variable, value: Value) -> Result<(), RuntimeError>;

    fn read_static(&self, member: &MemberInfo) -> Result<Value, RuntimeError>;

    fn write_static(&mut self, member: &MemberInfo, value: Value) -> Result<(), RuntimeError>;

    fn read_member(&self, object: &ObjectRef, member: &MemberInfo) -> Result<Value, RuntimeError> {
        object.get(&member.name).ok_or_else(|| RuntimeError::MissingMember {
            class: object.class(),
            member: member.name.clone(),
        })
    }

    fn write_member(
        &mut self,
        object: &ObjectRef,
        member: &MemberInfo,
        value: Value,
    ) -> Result<(), RuntimeError> {
        object.set(&member.name, value);
        Ok(())
    }

    fn read_element(&self, array: &ArrayRef, index: usize) -> Result<Value, RuntimeError> {
        array.get(index).ok_or(RuntimeError::IndexOutOfBounds {
            index: index as i128,
            len: array.len(),
        })
    }

    fn write_element(&mut self, array: &ArrayRef, index: usize, value: Value) -> Result<(), RuntimeError> {
        if array.set(index, value) {
            Ok(())
        } else {
            Err(RuntimeError::IndexOutOfBounds {
                index: index as i128,
                len: array.len(),
            })
        }
    }

    /// Unset indexer entries read as the default value of the property type.
    fn read_indexed(&self, object: &ObjectRef, member: &MemberInfo, args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(object
            .get_indexed(&member.name, args)
            .unwrap_or_else(|| Value::default_of(&member.ty)))
    }

    fn write_indexed(
        &mut self,
        object: &ObjectRef,
        member: &MemberInfo,
        args: &[Value],
        value: Value,
    ) -> Result<(), RuntimeError> {
        object.set_indexed(&member.name, args, value);
        Ok(())
    }
}

/// Default host: a flat variable table plus static member storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    variables: FxHashMap<u64, Value>,
    statics: FxHashMap<(SmolStr, SmolStr), Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `value`, rejecting values that do not inhabit its type.
    pub fn define(&mut self, variable: &Variable, value: impl Into<Value>) -> Result<(), RuntimeError> {
        let value = value.into();
        if !value.conforms_to(&variable.ty) {
            return Err(RuntimeError::type_mismatch(variable.ty.clone(), &value));
        }

        self.variables.insert(variable.id, value);
        Ok(())
    }

    pub fn get(&self, variable: &Variable) -> Option<&Value> {
        self.variables.get(&variable.id)
    }

    pub fn set_static(&mut self, member: &MemberInfo, value: impl Into<Value>) {
        self.statics.insert(static_key(member), value.into());
    }

    pub fn get_static(&self, member: &MemberInfo) -> Option<&Value> {
        self.statics.get(&static_key(member))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[inline(always)]
fn static_key(member: &MemberInfo) -> (SmolStr, SmolStr) {
    (member.declaring_type.clone(), member.name.clone())
}

impl Host for Env {
    fn read_variable(&self, variable: &Variable) -> Result<Value, RuntimeError> {
        self.variables
            .get(&variable.id)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable(variable.display_name()))
    }

    fn write_variable(&mut self, variable: &Variable, value: Value) -> Result<(), RuntimeError> {
        self.variables.insert(variable.id, value);
        Ok(())
    }

    /// Statics that were never set hold the default value of their type.
    fn read_static(&self, member: &MemberInfo) -> Result<Value, RuntimeError> {
        Ok(self
            .get_static(member)
            .cloned()
            .unwrap_or_else(|| Value::default_of(&member.ty)))
    }

    fn write_static(&mut self, member: &MemberInfo, value: Value) -> Result<(), RuntimeError> {
        self.set_static(member, value);
        Ok(())
    }
}
