use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
    sync::atomic::{AtomicU64, Ordering},
};

use smol_str::SmolStr;

use crate::{
    Shared,
    error::runtime::RuntimeError,
    number::{Direction, NumericKinds, UnitOp},
    reflect::{MemberInfo, MethodInfo},
    types::Type,
    value::Value,
};

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

/// A local variable. Every created variable is distinct, even when two share
/// a name and a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub id: u64,
    pub name: Option<SmolStr>,
    pub ty: Type,
}

impl Variable {
    pub fn new(name: Option<&str>, ty: Type) -> Self {
        Self {
            id: NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.map(SmolStr::new),
            ty,
        }
    }

    pub fn display_name(&self) -> SmolStr {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("$var{}", self.id).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOpKind {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl AssignOpKind {
    pub fn direction(self) -> Direction {
        match self {
            AssignOpKind::PreIncrement | AssignOpKind::PostIncrement => Direction::Increment,
            AssignOpKind::PreDecrement | AssignOpKind::PostDecrement => Direction::Decrement,
        }
    }

    /// Pre forms yield the new value, post forms the old one.
    #[inline(always)]
    pub fn yields_new(self) -> bool {
        matches!(self, AssignOpKind::PreIncrement | AssignOpKind::PreDecrement)
    }

    /// Name of the operator method looked up when no method is supplied.
    pub fn operator_name(self) -> &'static str {
        match self.direction() {
            Direction::Increment => "op_Increment",
            Direction::Decrement => "op_Decrement",
        }
    }
}

impl Display for AssignOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AssignOpKind::PreIncrement => write!(f, "PreIncrementAssign"),
            AssignOpKind::PreDecrement => write!(f, "PreDecrementAssign"),
            AssignOpKind::PostIncrement => write!(f, "PostIncrementAssign"),
            AssignOpKind::PostDecrement => write!(f, "PostDecrementAssign"),
        }
    }
}

/// How the new value is computed from the old one.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Builtin(UnitOp),
    Method {
        method: Shared<MethodInfo>,
        /// The method takes the unwrapped operand type; null skips the call.
        lifted: bool,
    },
}

impl Operation {
    pub fn apply(&self, value: &Value, ty: &Type) -> Result<Value, RuntimeError> {
        match self {
            Operation::Builtin(op) => op.apply(value),
            Operation::Method { method, lifted } => invoke_method(method, *lifted, ty, value),
        }
    }
}

pub(crate) fn invoke_method(
    method: &MethodInfo,
    lifted: bool,
    ty: &Type,
    value: &Value,
) -> Result<Value, RuntimeError> {
    if lifted && value.is_null() {
        return Ok(Value::Null);
    }

    let result = method.invoke(std::slice::from_ref(value))?;
    if result.conforms_to(ty) {
        Ok(result)
    } else {
        Err(RuntimeError::type_mismatch(ty.clone(), &result))
    }
}

/// A validated increment or decrement assignment.
///
/// Only the builder creates these, so every instance satisfies the operand and
/// method rules.
#[derive(Debug, Clone)]
pub struct AssignOp {
    pub(crate) kind: AssignOpKind,
    pub(crate) operand: Node,
    pub(crate) operation: Operation,
    pub(crate) ty: Type,
    pub(crate) kinds: Shared<NumericKinds>,
}

impl AssignOp {
    #[inline(always)]
    pub fn kind(&self) -> AssignOpKind {
        self.kind
    }

    #[inline(always)]
    pub fn operand(&self) -> &Node {
        &self.operand
    }

    #[inline(always)]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    #[inline(always)]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn method(&self) -> Option<&Shared<MethodInfo>> {
        match &self.operation {
            Operation::Method { method, .. } => Some(method),
            Operation::Builtin(_) => None,
        }
    }

    pub fn numeric_kinds(&self) -> &Shared<NumericKinds> {
        &self.kinds
    }
}

impl PartialEq for AssignOp {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.operand == other.operand
            && self.operation == other.operation
            && self.ty == other.ty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant {
        value: Value,
        ty: Type,
    },
    Variable(Shared<Variable>),
    /// Field or property access; `target` is `None` for static members.
    Member {
        target: Option<Node>,
        member: Shared<MemberInfo>,
    },
    ArrayIndex {
        array: Node,
        index: Node,
        ty: Type,
    },
    IndexedProperty {
        target: Node,
        member: Shared<MemberInfo>,
        args: Vec<Node>,
    },
    AssignOp(AssignOp),
}

impl Expr {
    pub fn ty(&self) -> Type {
        match self {
            Expr::Constant { ty, .. } | Expr::ArrayIndex { ty, .. } => ty.clone(),
            Expr::Variable(variable) => variable.ty.clone(),
            Expr::Member { member, .. } | Expr::IndexedProperty { member, .. } => member.ty.clone(),
            Expr::AssignOp(op) => op.ty.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Expr::Constant { .. } => "Constant",
            Expr::Variable(_) => "Variable",
            Expr::Member { .. } => "MemberAccess",
            Expr::ArrayIndex { .. } => "ArrayIndex",
            Expr::IndexedProperty { .. } => "IndexedProperty",
            Expr::AssignOp(_) => "AssignOp",
        }
    }
}

/// Shared handle to an immutable expression.
///
/// Cloning is cheap and keeps identity: [`Node::ptr_eq`] compares handles,
/// `==` compares structure.
#[derive(Debug, Clone)]
pub struct Node(Shared<Expr>);

impl Node {
    pub(crate) fn new(expr: Expr) -> Self {
        Self(Shared::new(expr))
    }

    #[inline(always)]
    pub fn expr(&self) -> &Expr {
        &self.0
    }

    #[inline(always)]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Shared::ptr_eq(&self.0, &other.0)
    }

    pub fn as_variable(&self) -> Option<&Shared<Variable>> {
        match self.expr() {
            Expr::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_assign_op(&self) -> Option<&AssignOp> {
        match self.expr() {
            Expr::AssignOp(op) => Some(op),
            _ => None,
        }
    }
}

impl Deref for Node {
    type Target = Expr;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.expr() {
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Variable(variable) => write!(f, "{}", variable.display_name()),
            Expr::Member {
                target: Some(target),
                member,
            } => write!(f, "{}.{}", target, member.name),
            Expr::Member { target: None, member } => {
                write!(f, "{}.{}", member.declaring_type, member.name)
            }
            Expr::ArrayIndex { array, index, .. } => write!(f, "{}[{}]", array, index),
            Expr::IndexedProperty { target, member, args } => write!(
                f,
                "{}.{}[{}]",
                target,
                member.name,
                args.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Expr::AssignOp(op) => match op.kind {
                AssignOpKind::PreIncrement => write!(f, "++{}", op.operand),
                AssignOpKind::PreDecrement => write!(f, "--{}", op.operand),
                AssignOpKind::PostIncrement => write!(f, "{}++", op.operand),
                AssignOpKind::PostDecrement => write!(f, "{}--", op.operand),
            },
        }
    }
}
