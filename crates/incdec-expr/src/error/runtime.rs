use smol_str::SmolStr;
use thiserror::Error;

use crate::{number::Direction, number::NumericKind, types::Type, value::Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Arithmetic operation resulted in an overflow ({kind} {direction})")]
    Overflow {
        kind: NumericKind,
        direction: Direction,
    },
    #[error("Object reference not set to an instance of an object, accessing \"{0}\"")]
    NullReference(SmolStr),
    #[error("Index was outside the bounds of the array, index {index}, length {len}")]
    IndexOutOfBounds { index: i128, len: usize },
    #[error("Undefined variable \"{0}\"")]
    UndefinedVariable(SmolStr),
    #[error("Member \"{member}\" is not set on an instance of \"{class}\"")]
    MissingMember { class: SmolStr, member: SmolStr },
    #[error("Expected a value of type \"{expected}\", got \"{found}\"")]
    TypeMismatch { expected: Type, found: SmolStr },
    #[error("Expression is not a writable location")]
    InvalidLocation,
    #[error("Method \"{method}\" failed: {message}")]
    Method { method: SmolStr, message: String },
}

impl RuntimeError {
    #[cold]
    pub fn type_mismatch(expected: Type, found: &Value) -> Self {
        RuntimeError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }

    /// Returns `true` for failures raised by checked arithmetic.
    pub fn is_overflow(&self) -> bool {
        matches!(self, RuntimeError::Overflow { .. })
    }
}
