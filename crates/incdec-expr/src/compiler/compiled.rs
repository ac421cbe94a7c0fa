//! Compiled expression types.

use crate::{ast::location::Slot, error::runtime::RuntimeError, eval::env::Host, value::Value};

/// A compiled expression.
///
/// The closure receives the host holding variables and statics and returns
/// the value of the expression.
///
/// ## Example
///
/// ```rust,ignore
/// let compiled: CompiledExpr = Box::new(|_host: &mut dyn Host| Ok(Value::Int32(42)));
/// assert_eq!(compiled(&mut Env::default())?, Value::Int32(42));
/// ```
pub type CompiledExpr = Box<dyn Fn(&mut dyn Host) -> Result<Value, RuntimeError> + Send + Sync>;

/// Resolves the addressing of a location for one invocation.
pub(crate) type CompiledSlot = Box<dyn Fn(&mut dyn Host) -> Result<Slot, RuntimeError> + Send + Sync>;

/// Computes the new value from the old one.
pub(crate) type CompiledStep = Box<dyn Fn(&Value) -> Result<Value, RuntimeError> + Send + Sync>;
