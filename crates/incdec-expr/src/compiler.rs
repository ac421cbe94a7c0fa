//! Closure-based executor.
//!
//! The compiler lowers a validated node into a boxed closure once; the closure
//! can then be invoked any number of times against a [`Host`](crate::Host).
//! Everything that depends only on the node is resolved at compile time: the
//! addressing of the location becomes a slot closure, and the operation
//! becomes either a captured [`StepFn`](crate::StepFn) or a captured method.
//! Each invocation still evaluates the addressing sub-expressions exactly once.
//!
//! Compiled closures and the tree-walking [`Evaluator`](crate::Evaluator)
//! produce the same values, side effects and errors.
//!
//! ## Example
//!
//! ```rust
//! use incdec_expr::{Builder, Compiler, Env, Type, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::default();
//! let builder = Builder::new(&registry);
//! let variable = builder.variable(Type::Double);
//! let node = builder.pre_increment_assign(variable.clone()).unwrap();
//!
//! let compiled = Compiler::new().compile(&node).unwrap();
//! let mut env = Env::default();
//! env.define(variable.as_variable().unwrap(), 0.5).unwrap();
//!
//! assert_eq!(compiled(&mut env).unwrap(), Value::Double(1.5));
//! assert_eq!(compiled(&mut env).unwrap(), Value::Double(2.5));
//! ```

mod compile;
pub(crate) mod compiled;
#[cfg(test)]
mod test_compiler;

pub use compile::Compiler;
