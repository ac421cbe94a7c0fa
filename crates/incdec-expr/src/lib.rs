//! `incdec-expr` builds, validates and executes increment/decrement assignment
//! expressions over writable locations.
//!
//! A node is built once through [`Builder`], which checks the operand and the
//! optional operator method against static type information. The node can
//! then be executed either by lowering it into a closure with [`Compiler`] or
//! by walking it with [`Evaluator`]. Both strategies produce the same values,
//! the same side effects and the same errors.
//!
//! ## Examples
//!
//! ```rust
//! use incdec_expr::{Builder, Engine, Env, Type, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::default();
//! let builder = Builder::new(&registry);
//!
//! let variable = builder.variable(Type::Int32);
//! let node = builder.post_decrement_assign(variable.clone()).unwrap();
//!
//! let mut env = Env::default();
//! env.define(variable.as_variable().unwrap(), 2).unwrap();
//!
//! let mut engine = Engine::default();
//! engine.set_use_compiler(true);
//!
//! assert_eq!(engine.eval(&node, &mut env).unwrap(), Value::Int32(2));
//! assert_eq!(env.get(variable.as_variable().unwrap()), Some(&Value::Int32(1)));
//! ```
mod ast;
mod compiler;
mod engine;
mod error;
mod eval;
mod number;
mod reflect;
mod types;
mod value;

pub type Shared<T> = std::sync::Arc<T>;
pub type SharedCell<T> = std::sync::RwLock<T>;

pub use ast::builder::Builder;
pub use ast::location::{LocationKind, Slot};
pub use ast::node::{AssignOp, AssignOpKind, Expr, Node, Operation, Variable};
pub use ast::visitor::{NoOpVisitor, Visitor, walk};
pub use compiler::Compiler;
pub use compiler::compiled::CompiledExpr;
pub use engine::{Engine, Options};
pub use error::Error;
pub use error::build::{BuildError, ShapeError};
pub use error::runtime::RuntimeError;
pub use eval::Evaluator;
pub use eval::env::{Env, Host};
pub use number::{Direction, NumericKind, NumericKinds, StepFn, UnitOp};
pub use reflect::{ClassInfo, MemberInfo, MemberKind, MethodInfo, NativeFn, TypeRegistry};
pub use types::Type;
pub use value::{ArrayRef, ObjectRef, Value};

pub type IncDecResult = Result<Value, Error>;
