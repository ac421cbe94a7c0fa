//! Writable locations.
//!
//! [`LocationKind`] is the static classification used by the builder.
//! [`Slot`] is the runtime counterpart: a location whose addressing
//! sub-expressions (instance, array, index, indexer arguments) have already
//! been evaluated, so it can be read and then written without evaluating them
//! again.

use std::fmt::{self, Display, Formatter};

use smallvec::SmallVec;
use tracing::trace;

use super::node::{Expr, Node, Variable};
use crate::{
    Shared,
    error::{
        build::{BuildError, ShapeError},
        runtime::RuntimeError,
    },
    eval::env::Host,
    reflect::MemberInfo,
    types::Type,
    value::{ArrayRef, ObjectRef, Value},
};

pub type IndexArgs = SmallVec<[Value; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Variable,
    InstanceMember,
    StaticMember,
    ArrayElement,
    IndexedProperty,
}

impl LocationKind {
    /// Classifies `node` as a location, or `None` for values such as
    /// constants and assignment results.
    pub fn classify(node: &Node) -> Option<Self> {
        match node.expr() {
            Expr::Variable(_) => Some(LocationKind::Variable),
            Expr::Member { target: Some(_), .. } => Some(LocationKind::InstanceMember),
            Expr::Member { target: None, .. } => Some(LocationKind::StaticMember),
            Expr::ArrayIndex { .. } => Some(LocationKind::ArrayElement),
            Expr::IndexedProperty { .. } => Some(LocationKind::IndexedProperty),
            Expr::Constant { .. } | Expr::AssignOp(_) => None,
        }
    }
}

impl Node {
    pub fn location_kind(&self) -> Option<LocationKind> {
        LocationKind::classify(self)
    }

    /// Returns `true` if the value of this node can be fetched.
    pub fn can_read(&self) -> bool {
        match self.expr() {
            Expr::Member { member, .. } | Expr::IndexedProperty { member, .. } => member.can_read(),
            Expr::Constant { .. } | Expr::Variable(_) | Expr::ArrayIndex { .. } | Expr::AssignOp(_) => true,
        }
    }

    /// Fails with `NotReadable` unless the value of this node can be fetched.
    pub fn require_readable(&self) -> Result<(), BuildError> {
        if self.can_read() {
            Ok(())
        } else {
            Err(BuildError::shape("expression", ShapeError::NotReadable))
        }
    }

    /// Returns `true` if this node denotes a location that accepts a new value.
    pub fn can_write(&self) -> bool {
        match self.expr() {
            Expr::Variable(_) | Expr::ArrayIndex { .. } => true,
            Expr::Member { member, .. } | Expr::IndexedProperty { member, .. } => member.can_write(),
            Expr::Constant { .. } | Expr::AssignOp(_) => false,
        }
    }
}

/// A resolved runtime location.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Variable(Shared<Variable>),
    Static(Shared<MemberInfo>),
    Member(ObjectRef, Shared<MemberInfo>),
    Element(ArrayRef, usize),
    Indexed(ObjectRef, Shared<MemberInfo>, IndexArgs),
}

impl Slot {
    pub fn member(target: Value, member: &Shared<MemberInfo>) -> Result<Self, RuntimeError> {
        Ok(Slot::Member(instance(target, member)?, Shared::clone(member)))
    }

    pub fn indexed(target: Value, member: &Shared<MemberInfo>, args: IndexArgs) -> Result<Self, RuntimeError> {
        Ok(Slot::Indexed(instance(target, member)?, Shared::clone(member), args))
    }

    /// Resolves an array element, checking the index against the current length.
    pub fn element(array: Value, index: Value) -> Result<Self, RuntimeError> {
        let array = match array {
            Value::Array(array) => array,
            Value::Null => return Err(RuntimeError::NullReference("array".into())),
            _ => return Err(RuntimeError::InvalidLocation),
        };
        let position = index
            .as_index()
            .ok_or_else(|| RuntimeError::type_mismatch(Type::Int64, &index))?;

        match usize::try_from(position) {
            Ok(i) if i < array.len() => Ok(Slot::Element(array, i)),
            _ => Err(RuntimeError::IndexOutOfBounds {
                index: position,
                len: array.len(),
            }),
        }
    }

    pub fn read(&self, host: &dyn Host) -> Result<Value, RuntimeError> {
        let value = match self {
            Slot::Variable(variable) => host.read_variable(variable),
            Slot::Static(member) => host.read_static(member),
            Slot::Member(object, member) => host.read_member(object, member),
            Slot::Element(array, index) => host.read_element(array, *index),
            Slot::Indexed(object, member, args) => host.read_indexed(object, member, args),
        }?;

        trace!(slot = %self, %value, "read");
        Ok(value)
    }

    pub fn write(&self, host: &mut dyn Host, value: Value) -> Result<(), RuntimeError> {
        trace!(slot = %self, %value, "write");

        match self {
            Slot::Variable(variable) => host.write_variable(variable, value),
            Slot::Static(member) => host.write_static(member, value),
            Slot::Member(object, member) => host.write_member(object, member, value),
            Slot::Element(array, index) => host.write_element(array, *index, value),
            Slot::Indexed(object, member, args) => host.write_indexed(object, member, args, value),
        }
    }
}

fn instance(target: Value, member: &MemberInfo) -> Result<ObjectRef, RuntimeError> {
    match target {
        Value::Object(object) => Ok(object),
        Value::Null => Err(RuntimeError::NullReference(member.name.clone())),
        other => Err(RuntimeError::type_mismatch(
            Type::Class(member.declaring_type.clone()),
            &other,
        )),
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Variable(variable) => write!(f, "{}", variable.display_name()),
            Slot::Static(member) => write!(f, "{}.{}", member.declaring_type, member.name),
            Slot::Member(object, member) => write!(f, "<{}>.{}", object.class(), member.name),
            Slot::Element(_, index) => write!(f, "[{}]", index),
            Slot::Indexed(object, member, args) => write!(
                f,
                "<{}>.{}[{}]",
                object.class(),
                member.name,
                args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}
