// Tree-walking executor.
// Every call walks the node again: addressing sub-expressions are evaluated
// into a `Slot`, the slot is read once, the operation computes the new value,
// and the slot is written once. A failing operation skips the write.
use tracing::trace;

pub mod env;

use crate::{
    IncDecResult, Shared,
    ast::{
        location::{IndexArgs, Slot},
        node::{AssignOp, Expr, Node},
    },
    error::runtime::RuntimeError,
    value::Value,
};
use env::Host;

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `node` against `host`, rejecting a node that cannot be read.
    pub fn eval(&self, node: &Node, host: &mut dyn Host) -> IncDecResult {
        node.require_readable()?;
        Ok(self.eval_node(node, host)?)
    }

    fn eval_node(&self, node: &Node, host: &mut dyn Host) -> Result<Value, RuntimeError> {
        match node.expr() {
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::AssignOp(op) => self.eval_assign_op(op, host),
            Expr::Variable(_) | Expr::Member { .. } | Expr::ArrayIndex { .. } | Expr::IndexedProperty { .. } => {
                let slot = self.eval_slot(node, host)?;
                slot.read(host)
            }
        }
    }

    /// Evaluates the addressing sub-expressions of a location node.
    pub fn eval_slot(&self, node: &Node, host: &mut dyn Host) -> Result<Slot, RuntimeError> {
        match node.expr() {
            Expr::Variable(variable) => Ok(Slot::Variable(Shared::clone(variable))),
            Expr::Member { target: None, member } => Ok(Slot::Static(Shared::clone(member))),
            Expr::Member {
                target: Some(target),
                member,
            } => {
                let target = self.eval_node(target, host)?;
                Slot::member(target, member)
            }
            Expr::ArrayIndex { array, index, .. } => {
                let array = self.eval_node(array, host)?;
                let index = self.eval_node(index, host)?;
                Slot::element(array, index)
            }
            Expr::IndexedProperty { target, member, args } => {
                let target = self.eval_node(target, host)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_node(arg, host))
                    .collect::<Result<IndexArgs, _>>()?;
                Slot::indexed(target, member, args)
            }
            Expr::Constant { .. } | Expr::AssignOp(_) => Err(RuntimeError::InvalidLocation),
        }
    }

    fn eval_assign_op(&self, op: &AssignOp, host: &mut dyn Host) -> Result<Value, RuntimeError> {
        let slot = self.eval_slot(op.operand(), host)?;
        let old = slot.read(host)?;
        let new = op.operation().apply(&old, op.ty())?;

        trace!(kind = %op.kind(), %old, %new, "evaluated assignment operator");
        slot.write(host, new.clone())?;

        if op.kind().yields_new() { Ok(new) } else { Ok(old) }
    }
}
