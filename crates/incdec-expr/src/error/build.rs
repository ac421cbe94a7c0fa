use smol_str::SmolStr;
use thiserror::Error;

use crate::{ast::node::AssignOpKind, types::Type};

/// Failures detected while building a node. All of them are derived from
/// static type information only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Value cannot be null (parameter '{0}')")]
    NullArgument(&'static str),
    #[error("{reason} (parameter '{param}')")]
    InvalidShape {
        param: &'static str,
        reason: ShapeError,
    },
    #[error("The unary operator {kind} is not defined for the type '{ty}'")]
    Unsupported { kind: AssignOpKind, ty: Type },
}

impl BuildError {
    #[cold]
    pub(crate) fn shape(param: &'static str, reason: ShapeError) -> Self {
        BuildError::InvalidShape { param, reason }
    }

    /// The parameter the failure is attributed to, if any.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            BuildError::NullArgument(param) => Some(param),
            BuildError::InvalidShape { param, .. } => Some(param),
            BuildError::Unsupported { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Expression must be writeable")]
    NotWritable,
    #[error("Expression must be readable")]
    NotReadable,
    #[error("Method {0} contains generic parameters")]
    GenericMethod(SmolStr),
    #[error("User-defined operator method '{0}' must be static")]
    NotStatic(SmolStr),
    #[error("User-defined operator method '{0}' must not be void")]
    VoidReturn(SmolStr),
    #[error("Incorrect number of arguments supplied for call to method '{method}', expected {expected}, got {found}")]
    ParameterCount {
        method: SmolStr,
        expected: usize,
        found: usize,
    },
    #[error("The operands for operator '{kind}' do not match the parameters of method '{method}'")]
    OperandMismatch { kind: AssignOpKind, method: SmolStr },
    #[error("The user-defined operator method '{method}' for operator '{kind}' must return a type assignable to the operand")]
    ReturnType { kind: AssignOpKind, method: SmolStr },
    #[error("{member} is not a member of type '{class}'")]
    UnknownMember { class: SmolStr, member: SmolStr },
    #[error("Static member '{0}' cannot be accessed through an instance")]
    StaticWithInstance(SmolStr),
    #[error("Instance member '{0}' requires an instance")]
    InstanceRequired(SmolStr),
    #[error("Property '{0}' is indexed and requires arguments")]
    IndexerRequired(SmolStr),
    #[error("Property '{0}' is not indexed")]
    NotIndexed(SmolStr),
    #[error("Incorrect number of indexes, expected {expected}, got {found}")]
    IndexCount { expected: usize, found: usize },
    #[error("Argument must be an array")]
    NotArray,
    #[error("Array index must be an integer, got '{0}'")]
    IndexNotIntegral(Type),
    #[error("Expression of type '{found}' cannot be used for type '{expected}'")]
    TypeMismatch { expected: Type, found: Type },
    #[error("Expression is not an assignment operator")]
    NotAssignOp,
}
