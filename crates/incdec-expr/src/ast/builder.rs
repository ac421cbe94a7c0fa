//! Node construction and validation.
//!
//! Every factory checks its arguments against static type information only.
//! A node that comes out of this module is valid for both executors; nothing
//! is re-checked at execution time except the data-dependent failures
//! (overflow, null instances, index bounds).

use tracing::debug;

use super::node::{AssignOp, AssignOpKind, Expr, Node, Operation, Variable};
use crate::{
    Shared,
    error::build::{BuildError, ShapeError},
    number::NumericKinds,
    reflect::{MemberInfo, MethodInfo, TypeRegistry},
    types::Type,
    value::Value,
};

/// Creates validated nodes, resolving members and operator methods through a
/// [`TypeRegistry`].
#[derive(Debug, Clone)]
pub struct Builder<'a> {
    registry: &'a TypeRegistry,
    kinds: Shared<NumericKinds>,
}

macro_rules! assign_op_factories {
    ($($name:ident, $name_with:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name(&self, operand: impl Into<Option<Node>>) -> Result<Node, BuildError> {
                self.assign_op(AssignOpKind::$kind, operand, None)
            }

            pub fn $name_with(
                &self,
                operand: impl Into<Option<Node>>,
                method: impl Into<Option<Shared<MethodInfo>>>,
            ) -> Result<Node, BuildError> {
                self.assign_op(AssignOpKind::$kind, operand, method.into())
            }
        )*
    };
}

impl<'a> Builder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            kinds: Shared::new(NumericKinds::default()),
        }
    }

    /// Replaces the set of numeric kinds that get built-in increment and decrement.
    pub fn with_numeric_kinds(mut self, kinds: NumericKinds) -> Self {
        self.kinds = Shared::new(kinds);
        self
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn numeric_kinds(&self) -> &NumericKinds {
        &self.kinds
    }

    pub fn constant(&self, value: impl Into<Value>, ty: Type) -> Result<Node, BuildError> {
        let value = value.into();
        if !value.conforms_to(&ty) {
            return Err(BuildError::shape(
                "value",
                ShapeError::TypeMismatch {
                    expected: ty,
                    found: value.ty(),
                },
            ));
        }

        Ok(Node::new(Expr::Constant { value, ty }))
    }

    pub fn variable(&self, ty: Type) -> Node {
        Node::new(Expr::Variable(Shared::new(Variable::new(None, ty))))
    }

    pub fn named_variable(&self, name: &str, ty: Type) -> Node {
        Node::new(Expr::Variable(Shared::new(Variable::new(Some(name), ty))))
    }

    /// Accesses a property of `class`. Pass `None` as `target` for static properties.
    pub fn property(&self, target: impl Into<Option<Node>>, class: &str, name: &str) -> Result<Node, BuildError> {
        let member = self.lookup_member(class, name, "propertyName")?;
        if member.is_field() {
            return Err(unknown_member(class, name, "propertyName"));
        }
        member_node(target.into(), member)
    }

    pub fn static_property(&self, class: &str, name: &str) -> Result<Node, BuildError> {
        self.property(None::<Node>, class, name)
    }

    pub fn field(&self, target: impl Into<Option<Node>>, class: &str, name: &str) -> Result<Node, BuildError> {
        let member = self.lookup_member(class, name, "fieldName")?;
        if !member.is_field() {
            return Err(unknown_member(class, name, "fieldName"));
        }
        member_node(target.into(), member)
    }

    pub fn array_index(&self, array: Node, index: Node) -> Result<Node, BuildError> {
        array_index_node(array, index)
    }

    pub fn indexed_property(
        &self,
        target: Node,
        class: &str,
        name: &str,
        args: Vec<Node>,
    ) -> Result<Node, BuildError> {
        let member = self.lookup_member(class, name, "propertyName")?;
        indexed_node(target, member, args)
    }

    /// Builds an assignment operator of `kind` over `operand`.
    ///
    /// Without a method the operand type must be one of the configured numeric
    /// kinds, or its class must declare a matching `op_Increment` /
    /// `op_Decrement` operator.
    pub fn assign_op(
        &self,
        kind: AssignOpKind,
        operand: impl Into<Option<Node>>,
        method: Option<Shared<MethodInfo>>,
    ) -> Result<Node, BuildError> {
        assign_op_node(kind, operand.into(), method, &self.kinds, Some(self.registry))
    }

    assign_op_factories!(
        pre_increment_assign, pre_increment_assign_with => PreIncrement,
        pre_decrement_assign, pre_decrement_assign_with => PreDecrement,
        post_increment_assign, post_increment_assign_with => PostIncrement,
        post_decrement_assign, post_decrement_assign_with => PostDecrement,
    );

    fn lookup_member(&self, class: &str, name: &str, param: &'static str) -> Result<Shared<MemberInfo>, BuildError> {
        self.registry
            .member(class, name)
            .ok_or_else(|| unknown_member(class, name, param))
    }
}

impl Node {
    /// Returns this node with `operand` replaced.
    ///
    /// When `operand` is the current operand (by identity) the same node is
    /// returned; otherwise a new node is validated with the same kind, method
    /// and numeric kinds.
    pub fn update_operand(&self, operand: Node) -> Result<Node, BuildError> {
        let Expr::AssignOp(op) = self.expr() else {
            return Err(BuildError::shape("node", ShapeError::NotAssignOp));
        };
        if op.operand.ptr_eq(&operand) {
            return Ok(self.clone());
        }

        assign_op_node(op.kind, Some(operand), op.method().cloned(), &op.kinds, None)
    }

    pub(crate) fn update_member(&self, target: Option<Node>) -> Result<Node, BuildError> {
        match self.expr() {
            Expr::Member {
                target: current,
                member,
            } => {
                let unchanged = match (current, &target) {
                    (Some(current), Some(target)) => current.ptr_eq(target),
                    (None, None) => true,
                    _ => false,
                };

                if unchanged {
                    Ok(self.clone())
                } else {
                    member_node(target, Shared::clone(member))
                }
            }
            _ => Ok(self.clone()),
        }
    }

    pub(crate) fn update_array_index(&self, array: Node, index: Node) -> Result<Node, BuildError> {
        match self.expr() {
            Expr::ArrayIndex {
                array: current_array,
                index: current_index,
                ..
            } if !(current_array.ptr_eq(&array) && current_index.ptr_eq(&index)) => array_index_node(array, index),
            _ => Ok(self.clone()),
        }
    }

    pub(crate) fn update_indexed(&self, target: Node, args: Vec<Node>) -> Result<Node, BuildError> {
        match self.expr() {
            Expr::IndexedProperty {
                target: current_target,
                member,
                args: current_args,
            } => {
                let unchanged = current_target.ptr_eq(&target)
                    && current_args.len() == args.len()
                    && current_args.iter().zip(&args).all(|(a, b)| a.ptr_eq(b));

                if unchanged {
                    Ok(self.clone())
                } else {
                    indexed_node(target, Shared::clone(member), args)
                }
            }
            _ => Ok(self.clone()),
        }
    }
}

#[cold]
fn unknown_member(class: &str, name: &str, param: &'static str) -> BuildError {
    BuildError::shape(
        param,
        ShapeError::UnknownMember {
            class: class.into(),
            member: name.into(),
        },
    )
}

fn require_instance(target: &Node, member: &MemberInfo) -> Result<(), BuildError> {
    let expected = Type::Class(member.declaring_type.clone());
    let found = target.ty();
    if !expected.is_reference_assignable_from(&found) {
        return Err(BuildError::shape("expression", ShapeError::TypeMismatch { expected, found }));
    }
    target.require_readable()
}

fn member_node(target: Option<Node>, member: Shared<MemberInfo>) -> Result<Node, BuildError> {
    if member.is_indexed() {
        return Err(BuildError::shape(
            "propertyName",
            ShapeError::IndexerRequired(member.name.clone()),
        ));
    }

    match (&target, member.is_static) {
        (Some(_), true) => {
            return Err(BuildError::shape(
                "expression",
                ShapeError::StaticWithInstance(member.name.clone()),
            ));
        }
        (None, false) => {
            return Err(BuildError::shape(
                "expression",
                ShapeError::InstanceRequired(member.name.clone()),
            ));
        }
        (Some(target), false) => require_instance(target, &member)?,
        (None, true) => {}
    }

    Ok(Node::new(Expr::Member { target, member }))
}

fn array_index_node(array: Node, index: Node) -> Result<Node, BuildError> {
    let array_ty = array.ty();
    let element = array_ty
        .element_type()
        .ok_or_else(|| BuildError::shape("array", ShapeError::NotArray))?
        .clone();

    let index_ty = index.ty();
    if !index_ty.is_integral() {
        return Err(BuildError::shape("index", ShapeError::IndexNotIntegral(index_ty)));
    }
    if !array.can_read() {
        return Err(BuildError::shape("array", ShapeError::NotReadable));
    }
    if !index.can_read() {
        return Err(BuildError::shape("index", ShapeError::NotReadable));
    }

    Ok(Node::new(Expr::ArrayIndex {
        array,
        index,
        ty: element,
    }))
}

fn indexed_node(target: Node, member: Shared<MemberInfo>, args: Vec<Node>) -> Result<Node, BuildError> {
    if !member.is_indexed() {
        return Err(BuildError::shape(
            "propertyName",
            ShapeError::NotIndexed(member.name.clone()),
        ));
    }
    if member.is_static {
        return Err(BuildError::shape(
            "expression",
            ShapeError::StaticWithInstance(member.name.clone()),
        ));
    }
    require_instance(&target, &member)?;

    if args.len() != member.index_params.len() {
        return Err(BuildError::shape(
            "arguments",
            ShapeError::IndexCount {
                expected: member.index_params.len(),
                found: args.len(),
            },
        ));
    }

    for (param, arg) in member.index_params.iter().zip(&args) {
        let found = arg.ty();
        if !param.is_assignable_from(&found) {
            return Err(BuildError::shape(
                "arguments",
                ShapeError::TypeMismatch {
                    expected: param.clone(),
                    found,
                },
            ));
        }
        if !arg.can_read() {
            return Err(BuildError::shape("arguments", ShapeError::NotReadable));
        }
    }

    Ok(Node::new(Expr::IndexedProperty { target, member, args }))
}

fn assign_op_node(
    kind: AssignOpKind,
    operand: Option<Node>,
    method: Option<Shared<MethodInfo>>,
    kinds: &Shared<NumericKinds>,
    registry: Option<&TypeRegistry>,
) -> Result<Node, BuildError> {
    let result = validate_assign_op(kind, operand, method, kinds, registry);
    match &result {
        Ok(node) => debug!(%kind, %node, ty = %node.ty(), "built assignment operator"),
        Err(err) => debug!(%kind, error = %err, "rejected assignment operator"),
    }
    result
}

fn validate_assign_op(
    kind: AssignOpKind,
    operand: Option<Node>,
    method: Option<Shared<MethodInfo>>,
    kinds: &Shared<NumericKinds>,
    registry: Option<&TypeRegistry>,
) -> Result<Node, BuildError> {
    let operand = operand.ok_or(BuildError::NullArgument("expression"))?;
    if !operand.can_write() {
        return Err(BuildError::shape("expression", ShapeError::NotWritable));
    }
    operand.require_readable()?;

    let ty = operand.ty();
    let operation = match method {
        Some(method) => method_operation(kind, &ty, method)?,
        None => match kinds.resolve(&ty, kind.direction()) {
            Some(unit) => Operation::Builtin(unit),
            None => {
                let method = registry
                    .and_then(|registry| registry.find_operator(&ty, kind.operator_name()))
                    .ok_or_else(|| BuildError::Unsupported { kind, ty: ty.clone() })?;
                method_operation(kind, &ty, method)?
            }
        },
    };

    Ok(Node::new(Expr::AssignOp(AssignOp {
        kind,
        operand,
        operation,
        ty,
        kinds: Shared::clone(kinds),
    })))
}

/// Validates a user-defined unary operator against the operand type.
///
/// The parameter must accept the operand type, or, for a nullable operand,
/// its wrapped type (the lifted form). The result, re-wrapped when lifted, must
/// be assignable back to the operand without conversion.
fn method_operation(kind: AssignOpKind, operand: &Type, method: Shared<MethodInfo>) -> Result<Operation, BuildError> {
    let name = method.qualified_name();
    let fail = |reason| Err(BuildError::shape("method", reason));

    if method.contains_generic_parameters() {
        return fail(ShapeError::GenericMethod(name));
    }
    if !method.is_static {
        return fail(ShapeError::NotStatic(name));
    }
    if method.return_type == Type::Void {
        return fail(ShapeError::VoidReturn(name));
    }
    if method.params.len() != 1 {
        return fail(ShapeError::ParameterCount {
            method: name,
            expected: 1,
            found: method.params.len(),
        });
    }

    let param = &method.params[0];
    if param.is_reference_assignable_from(operand) {
        if !operand.is_reference_assignable_from(&method.return_type) {
            return fail(ShapeError::ReturnType { kind, method: name });
        }
        return Ok(Operation::Method { method, lifted: false });
    }

    let returns_plain_value = method.return_type.is_value_type() && !method.return_type.is_nullable();
    if operand.is_nullable() && param.is_reference_assignable_from(operand.non_nullable()) && returns_plain_value {
        if !operand.is_reference_assignable_from(&Type::nullable(method.return_type.clone())) {
            return fail(ShapeError::ReturnType { kind, method: name });
        }
        return Ok(Operation::Method { method, lifted: true });
    }

    fail(ShapeError::OperandMismatch { kind, method: name })
}
