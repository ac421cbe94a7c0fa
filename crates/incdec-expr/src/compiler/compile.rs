//! Lowering of nodes into closures.

use tracing::{debug, trace};

use super::compiled::{CompiledExpr, CompiledSlot, CompiledStep};
use crate::{
    Shared,
    ast::{
        location::{IndexArgs, Slot},
        node::{AssignOp, Expr, Node, Operation, invoke_method},
    },
    error::build::{BuildError, ShapeError},
    eval::env::Host,
    number::UnitOp,
    value::Value,
};

/// Compiler for transforming nodes into [`CompiledExpr`] closures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles `node` into a reusable closure.
    ///
    /// Fails when `node` itself cannot be read, such as a write-only member.
    /// Nodes under it were checked by the builder.
    pub fn compile(&self, node: &Node) -> Result<CompiledExpr, BuildError> {
        debug!(%node, "compiling expression");
        node.require_readable()?;
        self.compile_node(node)
    }

    fn compile_node(&self, node: &Node) -> Result<CompiledExpr, BuildError> {
        match node.expr() {
            Expr::Constant { value, .. } => {
                let value = value.clone();
                Ok(Box::new(move |_host: &mut dyn Host| Ok(value.clone())))
            }
            Expr::AssignOp(op) => self.compile_assign_op(op),
            Expr::Variable(_) | Expr::Member { .. } | Expr::ArrayIndex { .. } | Expr::IndexedProperty { .. } => {
                let slot = self.compile_slot(node)?;
                Ok(Box::new(move |host: &mut dyn Host| {
                    let slot = slot(&mut *host)?;
                    slot.read(host)
                }))
            }
        }
    }

    fn compile_slot(&self, node: &Node) -> Result<CompiledSlot, BuildError> {
        match node.expr() {
            Expr::Variable(variable) => {
                let variable = Shared::clone(variable);
                Ok(Box::new(move |_host: &mut dyn Host| {
                    Ok(Slot::Variable(Shared::clone(&variable)))
                }))
            }
            Expr::Member { target: None, member } => {
                let member = Shared::clone(member);
                Ok(Box::new(move |_host: &mut dyn Host| Ok(Slot::Static(Shared::clone(&member)))))
            }
            Expr::Member {
                target: Some(target),
                member,
            } => {
                let target = self.compile_node(target)?;
                let member = Shared::clone(member);
                Ok(Box::new(move |host: &mut dyn Host| {
                    let target = target(&mut *host)?;
                    Slot::member(target, &member)
                }))
            }
            Expr::ArrayIndex { array, index, .. } => {
                let array = self.compile_node(array)?;
                let index = self.compile_node(index)?;
                Ok(Box::new(move |host: &mut dyn Host| {
                    let array = array(&mut *host)?;
                    let index = index(&mut *host)?;
                    Slot::element(array, index)
                }))
            }
            Expr::IndexedProperty { target, member, args } => {
                let target = self.compile_node(target)?;
                let member = Shared::clone(member);
                let args = args
                    .iter()
                    .map(|arg| self.compile_node(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(move |host: &mut dyn Host| {
                    let target = target(&mut *host)?;
                    let args = args
                        .iter()
                        .map(|arg| arg(&mut *host))
                        .collect::<Result<IndexArgs, _>>()?;
                    Slot::indexed(target, &member, args)
                }))
            }
            Expr::Constant { .. } | Expr::AssignOp(_) => {
                Err(BuildError::shape("expression", ShapeError::NotWritable))
            }
        }
    }

    /// Resolves the operation once so each invocation only calls the step.
    fn compile_step(&self, op: &AssignOp) -> CompiledStep {
        match op.operation() {
            Operation::Builtin(unit) => {
                let step = unit.step_fn();
                let lifted = unit.lifted;
                Box::new(move |value: &Value| UnitOp::run(step, lifted, value))
            }
            Operation::Method { method, lifted } => {
                let method = Shared::clone(method);
                let lifted = *lifted;
                let ty = op.ty().clone();
                Box::new(move |value: &Value| invoke_method(&method, lifted, &ty, value))
            }
        }
    }

    fn compile_assign_op(&self, op: &AssignOp) -> Result<CompiledExpr, BuildError> {
        let slot = self.compile_slot(op.operand())?;
        let step = self.compile_step(op);
        let kind = op.kind();

        if kind.yields_new() {
            Ok(Box::new(move |host: &mut dyn Host| {
                let slot = slot(&mut *host)?;
                let old = slot.read(host)?;
                let new = step(&old)?;

                trace!(%kind, %old, %new, "executed compiled assignment operator");
                slot.write(host, new.clone())?;
                Ok(new)
            }))
        } else {
            Ok(Box::new(move |host: &mut dyn Host| {
                let slot = slot(&mut *host)?;
                let old = slot.read(host)?;
                let new = step(&old)?;

                trace!(%kind, %old, %new, "executed compiled assignment operator");
                slot.write(host, new)?;
                Ok(old)
            }))
        }
    }
}
