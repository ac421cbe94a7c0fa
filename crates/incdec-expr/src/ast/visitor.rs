use super::node::{Expr, Node};
use crate::error::build::BuildError;

/// Rewrites a tree bottom-up.
///
/// The default [`Visitor::visit`] visits every child and rebuilds the parent
/// through the `update_*` functions, so a visitor that changes nothing returns
/// the very same node instances it was given.
pub trait Visitor {
    fn visit(&mut self, node: &Node) -> Result<Node, BuildError> {
        walk(self, node)
    }
}

/// Visits the children of `node` and rebuilds it from the results.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) -> Result<Node, BuildError> {
    match node.expr() {
        Expr::Constant { .. } | Expr::Variable(_) => Ok(node.clone()),
        Expr::Member { target, .. } => {
            let target = target.as_ref().map(|target| visitor.visit(target)).transpose()?;
            node.update_member(target)
        }
        Expr::ArrayIndex { array, index, .. } => {
            let array = visitor.visit(array)?;
            let index = visitor.visit(index)?;
            node.update_array_index(array, index)
        }
        Expr::IndexedProperty { target, args, .. } => {
            let target = visitor.visit(target)?;
            let args = args.iter().map(|arg| visitor.visit(arg)).collect::<Result<Vec<_>, _>>()?;
            node.update_indexed(target, args)
        }
        Expr::AssignOp(op) => {
            let operand = visitor.visit(op.operand())?;
            node.update_operand(operand)
        }
    }
}

/// A visitor that replaces nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpVisitor;

impl Visitor for NoOpVisitor {}
